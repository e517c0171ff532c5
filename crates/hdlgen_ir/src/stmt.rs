//! Statements inside process bodies.

use crate::expr::{Expr, Operand};
use crate::ids::BlockId;
use serde::{Deserialize, Serialize};

/// One statement of a [`StatementBlock`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// Blocking or non-blocking assignment.
    Assign(Assign),
    /// Conditional.
    If(IfStatement),
    /// Multi-way branch.
    Case(CaseStatement),
    /// A named block with its own namespace.
    Scoped(ScopedBlock),
}

/// `lhs = rhs` (blocking) or `lhs <= rhs` (non-blocking).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assign {
    /// Assigned target.
    pub lhs: Expr,
    /// Assigned value.
    pub rhs: Expr,
    /// Blocking assignment when `true`.
    pub blocking: bool,
}

/// `if (cond) then_body else else_body`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStatement {
    /// The condition.
    pub cond: Expr,
    then_body: StatementBlock,
    else_body: StatementBlock,
}

impl IfStatement {
    /// Creates an `if` with empty branches.
    pub fn new(cond: Expr) -> Self {
        Self {
            cond,
            then_body: StatementBlock::new(),
            else_body: StatementBlock::new(),
        }
    }

    /// Statements run when the condition holds.
    pub fn then_body(&self) -> &StatementBlock {
        &self.then_body
    }

    /// Mutable access to the then branch.
    pub fn then_body_mut(&mut self) -> &mut StatementBlock {
        &mut self.then_body
    }

    /// Statements run otherwise.
    pub fn else_body(&self) -> &StatementBlock {
        &self.else_body
    }

    /// Mutable access to the else branch.
    pub fn else_body_mut(&mut self) -> &mut StatementBlock {
        &mut self.else_body
    }
}

/// One labelled arm of a case statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseArm {
    /// Value matched against the subject.
    pub label: Expr,
    /// Statements run on a match.
    pub body: StatementBlock,
}

/// `case (subject) label: body ... default: body endcase`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseStatement {
    /// The matched expression.
    pub subject: Expr,
    arms: Vec<CaseArm>,
    default: Option<StatementBlock>,
}

impl CaseStatement {
    /// Creates a case statement with no arms.
    pub fn new(subject: Expr) -> Self {
        Self {
            subject,
            arms: Vec::new(),
            default: None,
        }
    }

    /// Adds an arm; a bare integer label takes the subject's type.
    pub fn add_label(&mut self, label: impl Into<Operand>) -> &mut StatementBlock {
        let label = self.subject.coerce(label);
        let index = self.arms.len();
        self.arms.push(CaseArm {
            label,
            body: StatementBlock::new(),
        });
        &mut self.arms[index].body
    }

    /// The labelled arms in insertion order.
    pub fn arms(&self) -> &[CaseArm] {
        &self.arms
    }

    /// The default arm, if one was requested.
    pub fn default_body(&self) -> Option<&StatementBlock> {
        self.default.as_ref()
    }

    /// Returns the default arm, creating an empty one on first use.
    pub fn default_body_mut(&mut self) -> &mut StatementBlock {
        self.default.get_or_insert_with(StatementBlock::new)
    }
}

/// A named block statement.
///
/// The block's name and namespace live in the entity under `block`; nets and
/// variables declared with [`Scope::Block`](crate::Scope::Block) belong to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopedBlock {
    /// The block's ID in the owning entity.
    pub block: BlockId,
    /// The block's statements.
    pub body: StatementBlock,
}

/// An ordered list of statements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementBlock {
    statements: Vec<Statement>,
}

impl StatementBlock {
    /// Creates an empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an assignment; a bare integer `rhs` takes `lhs`'s type.
    pub fn add_assign(&mut self, lhs: Expr, rhs: impl Into<Operand>, blocking: bool) {
        let rhs = lhs.coerce(rhs);
        self.statements.push(Statement::Assign(Assign { lhs, rhs, blocking }));
    }

    /// Appends an `if` and returns it for filling in its branches.
    pub fn add_if(&mut self, cond: Expr) -> &mut IfStatement {
        self.statements.push(Statement::If(IfStatement::new(cond)));
        match self.statements.last_mut() {
            Some(Statement::If(s)) => s,
            _ => unreachable!("an if statement was just appended"),
        }
    }

    /// Appends a case statement and returns it for adding arms.
    pub fn add_case(&mut self, subject: Expr) -> &mut CaseStatement {
        self.statements
            .push(Statement::Case(CaseStatement::new(subject)));
        match self.statements.last_mut() {
            Some(Statement::Case(s)) => s,
            _ => unreachable!("a case statement was just appended"),
        }
    }

    /// Appends the named block `block` and returns its body.
    ///
    /// `block` comes from [`Entity::add_block`](crate::Entity::add_block).
    pub fn add_scoped_block(&mut self, block: BlockId) -> &mut StatementBlock {
        self.statements.push(Statement::Scoped(ScopedBlock {
            block,
            body: StatementBlock::new(),
        }));
        match self.statements.last_mut() {
            Some(Statement::Scoped(s)) => &mut s.body,
            _ => unreachable!("a named block was just appended"),
        }
    }

    /// Returns `true` if the block has no statements.
    pub fn is_null(&self) -> bool {
        self.statements.is_empty()
    }

    /// Returns the number of top-level statements.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns `true` if the block has no statements.
    pub fn is_empty(&self) -> bool {
        self.is_null()
    }

    /// The statements in order.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Calls `f` for every expression in the block, nested blocks included.
    pub fn for_each_expr(&self, f: &mut dyn FnMut(&Expr)) {
        for stmt in &self.statements {
            match stmt {
                Statement::Assign(a) => {
                    f(&a.lhs);
                    f(&a.rhs);
                }
                Statement::If(s) => {
                    f(&s.cond);
                    s.then_body.for_each_expr(f);
                    s.else_body.for_each_expr(f);
                }
                Statement::Case(c) => {
                    f(&c.subject);
                    for arm in &c.arms {
                        f(&arm.label);
                        arm.body.for_each_expr(f);
                    }
                    if let Some(d) = &c.default {
                        d.for_each_expr(f);
                    }
                }
                Statement::Scoped(s) => s.body.for_each_expr(f),
            }
        }
    }

    /// Calls `f` for every named block in the block, outermost first.
    pub fn for_each_scoped_block(&self, f: &mut dyn FnMut(&ScopedBlock)) {
        for stmt in &self.statements {
            match stmt {
                Statement::Assign(_) => {}
                Statement::If(s) => {
                    s.then_body.for_each_scoped_block(f);
                    s.else_body.for_each_scoped_block(f);
                }
                Statement::Case(c) => {
                    for arm in &c.arms {
                        arm.body.for_each_scoped_block(f);
                    }
                    if let Some(d) = &c.default {
                        d.for_each_scoped_block(f);
                    }
                }
                Statement::Scoped(s) => {
                    f(s);
                    s.body.for_each_scoped_block(f);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::NetId;
    use crate::types::DataType;

    fn net(id: u32, ty: DataType) -> Expr {
        Expr::net(NetId::from_raw(id), ty)
    }

    #[test]
    fn assign_coerces_rhs() {
        let q = net(0, DataType::BitVector(4));
        let mut block = StatementBlock::new();
        assert!(block.is_null());
        block.add_assign(q.clone(), 3, false);
        let Statement::Assign(a) = &block.statements()[0] else {
            panic!("expected assignment");
        };
        assert_eq!(a.rhs, Expr::constant(DataType::BitVector(4), 3));
        assert!(!a.blocking);
        assert!(!block.is_null());
    }

    #[test]
    fn if_branches_fill_in_place() {
        let c = net(0, DataType::Bit);
        let q = net(1, DataType::Bit);
        let mut block = StatementBlock::new();
        let s = block.add_if(c);
        s.then_body_mut().add_assign(q.clone(), 1, false);
        s.else_body_mut().add_assign(q, 0, false);
        let Statement::If(s) = &block.statements()[0] else {
            panic!("expected if");
        };
        assert_eq!(s.then_body().len(), 1);
        assert_eq!(s.else_body().len(), 1);
    }

    #[test]
    fn case_labels_take_subject_type() {
        let sel = net(0, DataType::BitVector(2));
        let q = net(1, DataType::Bit);
        let mut block = StatementBlock::new();
        let case = block.add_case(sel);
        case.add_label(2).add_assign(q.clone(), 1, false);
        assert!(case.default_body().is_none());
        case.default_body_mut().add_assign(q, 0, false);
        assert_eq!(
            case.arms()[0].label,
            Expr::constant(DataType::BitVector(2), 2)
        );
        assert_eq!(case.default_body().map(StatementBlock::len), Some(1));
    }

    #[test]
    fn walks_nested_expressions() {
        let c = net(0, DataType::Bit);
        let q = net(1, DataType::Bit);
        let mut block = StatementBlock::new();
        let inner = block.add_scoped_block(BlockId::from_raw(0));
        inner.add_if(c.clone()).then_body_mut().add_assign(q.clone(), c, true);
        let mut count = 0;
        block.for_each_expr(&mut |_| count += 1);
        assert_eq!(count, 3);
        let mut blocks = Vec::new();
        block.for_each_scoped_block(&mut |s| blocks.push(s.block));
        assert_eq!(blocks, vec![BlockId::from_raw(0)]);
    }
}
