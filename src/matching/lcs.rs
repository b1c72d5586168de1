//! Longest-common-subsequence list alignment.
//!
//! Used by the token attribute to score how much of two token lists line up.

use rustc_hash::FxHashMap;

/// Direction taken through the LCS score table.
#[derive(Clone, Copy)]
enum Dir {
    Up,
    Left,
    UpLeft,
}

/// Aligns two lists by longest common subsequence.
///
/// Returns a map from source index to target index for every aligned pair.
pub fn lcs_match<T, F>(src: &[T], tar: &[T], eq: F) -> FxHashMap<usize, usize>
where
    F: Fn(&T, &T) -> bool,
{
    let mut map = FxHashMap::default();
    let (src_len, tar_len) = (src.len(), tar.len());
    if src_len == 0 || tar_len == 0 {
        return map;
    }

    let mut score = vec![vec![0u32; tar_len + 1]; src_len + 1];
    let mut path = vec![vec![Dir::Up; tar_len + 1]; src_len + 1];

    for i in 0..src_len {
        for j in 0..tar_len {
            if eq(&src[i], &tar[j]) {
                score[i + 1][j + 1] = score[i][j] + 1;
                path[i + 1][j + 1] = Dir::UpLeft;
            } else if score[i + 1][j] >= score[i][j + 1] {
                score[i + 1][j + 1] = score[i + 1][j];
                path[i + 1][j + 1] = Dir::Left;
            } else {
                score[i + 1][j + 1] = score[i][j + 1];
                path[i + 1][j + 1] = Dir::Up;
            }
        }
    }

    let (mut i, mut j) = (src_len, tar_len);
    while i > 0 && j > 0 {
        match path[i][j] {
            Dir::UpLeft => {
                map.insert(i - 1, j - 1);
                i -= 1;
                j -= 1;
            }
            Dir::Left => j -= 1,
            Dir::Up => i -= 1,
        }
    }

    debug_assert_eq!(map.len() as u32, score[src_len][tar_len]);
    map
}
