//! The type compatibility checker.
//!
//! Each rule takes the tags of the operands being combined and either
//! returns the tag of the resulting node or rejects the combination. The
//! expression constructors call these before allocating a node, so an
//! incompatible node can never exist.

use crate::error::TypeError;
use crate::expr::Function;

use super::{ScalarType, TypeTag};

/// The class of operator being applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorClass {
    /// `=`, `!=`, `<`, `<=`, `>`, `>=`, IN, BETWEEN.
    Comparison,
    /// LIKE / NOT LIKE.
    Pattern,
    /// `+`, `-`, `*`, `/`.
    Arithmetic,
    /// AND, OR, NOT.
    Logical,
}

/// Applies the rule for `class` to a binary combination.
pub fn binary(class: OperatorClass, left: TypeTag, right: TypeTag) -> Result<TypeTag, TypeError> {
    match class {
        OperatorClass::Comparison => comparison(left, right),
        OperatorClass::Pattern => pattern(left, right),
        OperatorClass::Arithmetic => arithmetic(left, right),
        OperatorClass::Logical => logical(left, right),
    }
}

/// Comparison: operands must match after stripping `Optional`.
pub fn comparison(left: TypeTag, right: TypeTag) -> Result<TypeTag, TypeError> {
    if left.comparable_with(right) {
        Ok(TypeTag::BOOLEAN)
    } else {
        Err(TypeError::Incomparable { left, right })
    }
}

/// Pattern matching: both sides text.
pub fn pattern(left: TypeTag, right: TypeTag) -> Result<TypeTag, TypeError> {
    if left.scalar() == ScalarType::Text && right.scalar() == ScalarType::Text {
        Ok(TypeTag::BOOLEAN)
    } else {
        Err(TypeError::NonText { left, right })
    }
}

/// Arithmetic: numeric operands, `Real` if either side is `Real`,
/// `Optional` if either side is `Optional`.
pub fn arithmetic(left: TypeTag, right: TypeTag) -> Result<TypeTag, TypeError> {
    if !left.is_numeric() || !right.is_numeric() {
        return Err(TypeError::NonNumeric { left, right });
    }
    let scalar = if left.scalar() == ScalarType::Real || right.scalar() == ScalarType::Real {
        ScalarType::Real
    } else {
        ScalarType::Integer
    };
    Ok(TypeTag::new(scalar).nullable_if(left.is_optional() || right.is_optional()))
}

/// AND / OR over two boolean-result operands.
pub fn logical(left: TypeTag, right: TypeTag) -> Result<TypeTag, TypeError> {
    for tag in [left, right] {
        if !tag.is_boolean() {
            return Err(TypeError::NonBoolean {
                operator: "logical operator",
                found: tag,
            });
        }
    }
    Ok(TypeTag::BOOLEAN)
}

/// A single operand of AND / OR / NOT, or a clause predicate.
///
/// `bare_column` names the column when the operand is a raw column
/// reference; those are rejected even when boolean.
pub fn logical_operand(
    operator: &'static str,
    tag: TypeTag,
    bare_column: Option<String>,
) -> Result<(), TypeError> {
    if let Some(column) = bare_column {
        return Err(TypeError::BareColumn { column });
    }
    if tag.is_boolean() {
        Ok(())
    } else {
        Err(TypeError::NonBoolean {
            operator,
            found: tag,
        })
    }
}

/// Function call: argument count and accepted types, then the result tag.
pub fn function_call(function: Function, args: &[TypeTag]) -> Result<TypeTag, TypeError> {
    let expected = function.arity();
    let star_count = function == Function::Count && args.is_empty();
    if args.len() != expected && !star_count {
        return Err(TypeError::Arity {
            function: function.name(),
            expected,
            found: args.len(),
        });
    }
    for &arg in args {
        function_argument(function, arg)?;
    }
    Ok(function.result_type(args.first().copied()))
}

/// A single function argument.
pub fn function_argument(function: Function, arg: TypeTag) -> Result<(), TypeError> {
    if function.accepts(arg) {
        Ok(())
    } else {
        Err(TypeError::InvalidArgument {
            function: function.name(),
            found: arg,
        })
    }
}

/// CASE results: one scalar type across all branches. The result is
/// optional when any branch is, or when there is no ELSE.
pub fn case_branches(
    results: &[TypeTag],
    otherwise: Option<TypeTag>,
) -> Result<TypeTag, TypeError> {
    let Some(&first) = results.first() else {
        return Err(TypeError::EmptyCase);
    };
    let mut optional = otherwise.is_none();
    for &tag in results.iter().chain(otherwise.iter()) {
        if !first.comparable_with(tag) {
            return Err(TypeError::CaseBranchMismatch {
                expected: first,
                found: tag,
            });
        }
        optional |= tag.is_optional();
    }
    Ok(first.strip().nullable_if(optional))
}

/// Assigning a value to a column in INSERT or UPDATE.
pub fn assignment(column: &str, target: TypeTag, value: TypeTag) -> Result<(), TypeError> {
    let fits = target.comparable_with(value) && (target.is_optional() || !value.is_optional());
    if fits {
        Ok(())
    } else {
        Err(TypeError::Assignment {
            column: column.to_string(),
            expected: target,
            found: value,
        })
    }
}
