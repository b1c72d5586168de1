//! The closed set of syntax-tree node kinds and their slot layouts.
//!
//! Every kind owns a fixed list of named slots, each either a single-child
//! slot or an ordered child list. Leaf kinds carry a scalar value instead of
//! slots. Collapsing the per-kind classes of the original tool into one
//! enumeration lets tree walking, deep copy and slot access share a single
//! implementation.

/// Shape of a slot: at most one child, or an ordered list of children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotShape {
    /// Holds zero or one child.
    Single,
    /// Holds an ordered list of children; no duplicate entries.
    List,
}

/// Names of the slots a node kind may own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Condition,
    Then,
    Else,
    Body,
    Statements,
    Expression,
    Name,
    Receiver,
    Arguments,
    Left,
    Right,
    Operator,
    Operand,
    Type,
    Initializer,
    Initializers,
    Updaters,
    Parameters,
    Parameter,
    Modifiers,
    Catches,
    Finally,
    Array,
    Index,
}

/// The closed enumeration of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    // Declarations and statements
    MethodDeclaration,
    Block,
    IfStatement,
    WhileStatement,
    ForStatement,
    TryStatement,
    CatchClause,
    ReturnStatement,
    ThrowStatement,
    ExpressionStatement,
    VariableDeclaration,
    BreakStatement,
    ContinueStatement,
    // Expressions
    MethodInvocation,
    InfixExpression,
    PrefixExpression,
    Assignment,
    FieldAccess,
    ArrayAccess,
    CastExpression,
    ConditionalExpression,
    ParenthesizedExpression,
    SimpleType,
    // Leaves
    SimpleName,
    QualifiedName,
    BooleanLiteral,
    NumberLiteral,
    StringLiteral,
    CharacterLiteral,
    NullLiteral,
    Modifier,
    Operator,
}

/// The mutable scalar carried by a leaf node.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// Identifier text of a simple or qualified name.
    Identifier(String),
    /// Boolean literal value.
    Bool(bool),
    /// Numeric literal token text.
    Number(String),
    /// String literal token text (escaped form).
    Str(String),
    /// Character literal token text (escaped form).
    Char(String),
    /// Modifier or operator keyword.
    Keyword(String),
}

impl ScalarValue {
    /// Renders the scalar as a single token string.
    pub fn as_token(&self) -> String {
        match self {
            ScalarValue::Identifier(s)
            | ScalarValue::Number(s)
            | ScalarValue::Str(s)
            | ScalarValue::Char(s)
            | ScalarValue::Keyword(s) => s.clone(),
            ScalarValue::Bool(b) => b.to_string(),
        }
    }
}

impl SyntaxKind {
    /// Returns the slot layout of this kind, in declaration order.
    pub fn slots(self) -> &'static [(Role, SlotShape)] {
        use Role::*;
        use SlotShape::*;
        match self {
            SyntaxKind::MethodDeclaration => &[
                (Modifiers, List),
                (Name, Single),
                (Parameters, List),
                (Body, Single),
            ],
            SyntaxKind::Block => &[(Statements, List)],
            SyntaxKind::IfStatement => &[(Condition, Single), (Then, Single), (Else, Single)],
            SyntaxKind::WhileStatement => &[(Condition, Single), (Body, Single)],
            SyntaxKind::ForStatement => &[
                (Initializers, List),
                (Condition, Single),
                (Updaters, List),
                (Body, Single),
            ],
            SyntaxKind::TryStatement => &[(Body, Single), (Catches, List), (Finally, Single)],
            SyntaxKind::CatchClause => &[(Parameter, Single), (Body, Single)],
            SyntaxKind::ReturnStatement => &[(Expression, Single)],
            SyntaxKind::ThrowStatement => &[(Expression, Single)],
            SyntaxKind::ExpressionStatement => &[(Expression, Single)],
            SyntaxKind::VariableDeclaration => {
                &[(Type, Single), (Name, Single), (Initializer, Single)]
            }
            SyntaxKind::BreakStatement | SyntaxKind::ContinueStatement => &[],
            SyntaxKind::MethodInvocation => {
                &[(Receiver, Single), (Name, Single), (Arguments, List)]
            }
            SyntaxKind::InfixExpression => {
                &[(Left, Single), (Operator, Single), (Right, Single)]
            }
            SyntaxKind::PrefixExpression => &[(Operator, Single), (Operand, Single)],
            SyntaxKind::Assignment => &[(Left, Single), (Right, Single)],
            SyntaxKind::FieldAccess => &[(Receiver, Single), (Name, Single)],
            SyntaxKind::ArrayAccess => &[(Array, Single), (Index, Single)],
            SyntaxKind::CastExpression => &[(Type, Single), (Expression, Single)],
            SyntaxKind::ConditionalExpression => {
                &[(Condition, Single), (Then, Single), (Else, Single)]
            }
            SyntaxKind::ParenthesizedExpression => &[(Expression, Single)],
            SyntaxKind::SimpleType => &[(Name, Single)],
            SyntaxKind::SimpleName
            | SyntaxKind::QualifiedName
            | SyntaxKind::BooleanLiteral
            | SyntaxKind::NumberLiteral
            | SyntaxKind::StringLiteral
            | SyntaxKind::CharacterLiteral
            | SyntaxKind::NullLiteral
            | SyntaxKind::Modifier
            | SyntaxKind::Operator => &[],
        }
    }

    /// Returns true if this kind is a leaf (owns no slots).
    pub fn is_leaf(self) -> bool {
        self.slots().is_empty()
    }

    /// Returns the shape of the slot with the given role, if the kind has it.
    pub fn slot_shape(self, role: Role) -> Option<SlotShape> {
        self.slots()
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, shape)| *shape)
    }

    /// Builds the scalar value this kind stores for the given raw text.
    ///
    /// Returns `None` for kinds without a scalar field (`NullLiteral`, every
    /// non-leaf kind); an `Update` landing on such a kind is skipped.
    pub fn scalar_from_text(self, text: &str) -> Option<ScalarValue> {
        match self {
            SyntaxKind::SimpleName | SyntaxKind::QualifiedName => {
                Some(ScalarValue::Identifier(text.to_string()))
            }
            SyntaxKind::BooleanLiteral => Some(ScalarValue::Bool(text == "true")),
            SyntaxKind::NumberLiteral => Some(ScalarValue::Number(text.to_string())),
            SyntaxKind::StringLiteral => Some(ScalarValue::Str(text.to_string())),
            SyntaxKind::CharacterLiteral => Some(ScalarValue::Char(text.to_string())),
            SyntaxKind::Modifier | SyntaxKind::Operator => {
                Some(ScalarValue::Keyword(text.to_string()))
            }
            _ => None,
        }
    }
}
