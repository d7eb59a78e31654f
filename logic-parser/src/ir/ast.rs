use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// 0, 1
    Literal(bool),
    /// ~A
    Unary {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
    /// A ^ B, A v B, A != B, A => B, A <=> B
    Binary {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },
    /// Result of a declaration or assignment. Has no truth value.
    Void,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not, // ~
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    And,           // ^
    Or,            // v
    Xor,           // !=
    Implication,   // =>
    Biconditional, // <=>
}

impl UnaryOperator {
    pub fn apply(self, operand: bool) -> bool {
        match self {
            Self::Not => !operand,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Not => "~",
        }
    }
}

impl BinaryOperator {
    pub fn apply(self, a: bool, b: bool) -> bool {
        match self {
            Self::And => a && b,
            Self::Or => a || b,
            Self::Xor => (a || b) && !(a && b),
            Self::Implication => !a || b,
            Self::Biconditional => (a && b) || (!a && !b),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::And => "^",
            Self::Or => "v",
            Self::Xor => "!=",
            Self::Implication => "=>",
            Self::Biconditional => "<=>",
        }
    }
}

impl Expr {
    pub fn not(operand: Expr) -> Self {
        Self::Unary {
            op: UnaryOperator::Not,
            operand: Box::new(operand),
        }
    }

    pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Self {
        Self::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    /// Truth value of the tree, or `None` for `Void` (anywhere in it).
    pub fn eval(&self) -> Option<bool> {
        match self {
            Self::Literal(value) => Some(*value),
            Self::Unary { op, operand } => operand.eval().map(|value| op.apply(value)),
            Self::Binary { left, op, right } => {
                let a = left.eval()?;
                let b = right.eval()?;
                Some(op.apply(a, b))
            }
            Self::Void => None,
        }
    }

    /// Node count and height of the tree, measured without recursion.
    pub fn shape(&self) -> Shape {
        let mut shape = Shape { nodes: 0, depth: 0 };
        let mut pending = vec![(self, 1)];
        while let Some((expr, depth)) = pending.pop() {
            shape.nodes += 1;
            shape.depth = shape.depth.max(depth);
            match expr {
                Self::Unary { operand, .. } => pending.push((operand, depth + 1)),
                Self::Binary { left, right, .. } => {
                    pending.push((left, depth + 1));
                    pending.push((right, depth + 1));
                }
                Self::Literal(_) | Self::Void => {}
            }
        }
        shape
    }
}

/// Size of an expression tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub nodes: usize,
    pub depth: usize,
}

impl Shape {
    pub const LEAF: Shape = Shape { nodes: 1, depth: 1 };

    /// Shape of `~operand`.
    pub fn unary(operand: Shape) -> Self {
        Self {
            nodes: operand.nodes.saturating_add(1),
            depth: operand.depth.saturating_add(1),
        }
    }

    /// Shape of `left op right`.
    pub fn binary(left: Shape, right: Shape) -> Self {
        Self {
            nodes: left.nodes.saturating_add(right.nodes).saturating_add(1),
            depth: left.depth.max(right.depth).saturating_add(1),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "{}", u8::from(*value)),
            Self::Unary { op, operand } => write!(f, "{}{operand}", op.symbol()),
            Self::Binary { left, op, right } => write!(f, "({left} {} {right})", op.symbol()),
            Self::Void => write!(f, "void"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOLS: [bool; 2] = [false, true];

    fn lit(value: bool) -> Expr {
        Expr::Literal(value)
    }

    #[test]
    fn truth_tables() {
        let cases = [
            (BinaryOperator::And, [false, false, false, true]),
            (BinaryOperator::Or, [false, true, true, true]),
            (BinaryOperator::Xor, [false, true, true, false]),
            (BinaryOperator::Implication, [true, true, false, true]),
            (BinaryOperator::Biconditional, [true, false, false, true]),
        ];

        for (op, expected) in cases {
            let actual = [(false, false), (false, true), (true, false), (true, true)]
                .map(|(a, b)| Expr::binary(lit(a), op, lit(b)).eval().unwrap());
            assert_eq!(actual, expected, "truth table of {op:?}");
        }
    }

    #[test]
    fn biconditional_is_negated_xor() {
        for a in BOOLS {
            for b in BOOLS {
                let bic = Expr::binary(lit(a), BinaryOperator::Biconditional, lit(b));
                let nxor = Expr::not(Expr::binary(lit(a), BinaryOperator::Xor, lit(b)));
                assert_eq!(bic.eval(), nxor.eval());
            }
        }
    }

    #[test]
    fn implication_is_or_of_negation() {
        for a in BOOLS {
            for b in BOOLS {
                let imp = Expr::binary(lit(a), BinaryOperator::Implication, lit(b));
                let or = Expr::binary(Expr::not(lit(a)), BinaryOperator::Or, lit(b));
                assert_eq!(imp.eval(), or.eval());
            }
        }
    }

    #[test]
    fn double_negation() {
        for a in BOOLS {
            assert_eq!(Expr::not(Expr::not(lit(a))).eval(), Some(a));
        }
    }

    #[test]
    fn void_has_no_value() {
        assert_eq!(Expr::Void.eval(), None);
        assert_eq!(Expr::not(Expr::Void).eval(), None);
        assert_eq!(
            Expr::binary(lit(true), BinaryOperator::Or, Expr::Void).eval(),
            None
        );
    }

    #[test]
    fn display_uses_source_syntax() {
        let expr = Expr::binary(
            Expr::not(lit(true)),
            BinaryOperator::Biconditional,
            Expr::binary(lit(false), BinaryOperator::Xor, lit(true)),
        );
        assert_eq!(expr.to_string(), "(~1 <=> (0 != 1))");
    }

    #[test]
    fn shape_counts_nodes_and_height() {
        let expr = Expr::binary(
            Expr::not(Expr::not(lit(true))),
            BinaryOperator::And,
            lit(false),
        );
        let shape = expr.shape();
        assert_eq!(shape, Shape { nodes: 5, depth: 4 });
        assert_eq!(
            Shape::binary(Shape::unary(Shape::unary(Shape::LEAF)), Shape::LEAF),
            shape
        );
        assert_eq!(lit(true).shape(), Shape::LEAF);
    }
}
