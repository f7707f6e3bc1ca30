//! Lambda map.
//!
//! Layout, all values compressed:
//!
//! ```text
//! method ordinal + 1
//! -baseline                                   \
//! closure count                                |  absent if the method has
//! closure syntax offset - baseline   (each)    |  no closures and no lambdas
//! lambda syntax offset - baseline,             |
//!   closure ordinal + 2              (each)   /
//! ```
//!
//! The baseline is the smallest syntax offset of any closure or lambda, but at most `-1`.
//! Closure and lambda ids are not stored: they are the position of the entry in its list.

use crate::{
    editandcontinue::{
        invalid_data, negate, relative_offset, to_i32,
        types::{ClosureDebugInfo, DebugId, LambdaDebugInfo},
        UNDEFINED_METHOD_ORDINAL,
    },
    encoding::compressed::write_compressed_count,
    Error, Parser, Result,
};

/// Appends the lambda map of a method to `buffer`.
///
/// # Arguments
///
/// * `method_ordinal` - Ordinal of the method among its overloads, or [`UNDEFINED_METHOD_ORDINAL`]
/// * `closures` - Closures of the method, with positional generation 0 ids
/// * `lambdas` - Lambdas of the method, with positional generation 0 ids
/// * `buffer` - Output buffer
///
/// # Errors
/// Returns [`crate::Error::ValueOutOfRange`] if `method_ordinal` is below
/// [`UNDEFINED_METHOD_ORDINAL`], an id is not positional, a lambda refers to a closure that
/// does not exist, or a syntax offset does not fit the compressed form.
///
/// # Examples
///
/// ```rust
/// use cdiscope::editandcontinue::{lambdamap::serialize_lambda_map, ClosureDebugInfo, DebugId};
///
/// let closures = [ClosureDebugInfo::new(-100, DebugId::new(0, 0))];
/// let mut buffer = Vec::new();
/// serialize_lambda_map(0x7b, &closures, &[], &mut buffer)?;
/// assert_eq!(buffer, [0x7C, 100, 0x01, 0x00]);
/// # Ok::<(), cdiscope::Error>(())
/// ```
pub fn serialize_lambda_map(
    method_ordinal: i32,
    closures: &[ClosureDebugInfo],
    lambdas: &[LambdaDebugInfo],
    buffer: &mut Vec<u8>,
) -> Result<()> {
    if method_ordinal < UNDEFINED_METHOD_ORDINAL {
        return Err(Error::ValueOutOfRange {
            value: i64::from(method_ordinal),
            message: "method ordinal must not be below -1",
        });
    }

    write_compressed_count(method_ordinal + 1, buffer)?;

    if closures.is_empty() && lambdas.is_empty() {
        return Ok(());
    }

    let baseline = closures
        .iter()
        .map(|closure| closure.syntax_offset)
        .chain(lambdas.iter().map(|lambda| lambda.syntax_offset))
        .fold(-1, i32::min);

    let closure_count = i32::try_from(closures.len()).map_err(|_| Error::ValueOutOfRange {
        value: i64::MAX,
        message: "too many closures",
    })?;

    write_compressed_count(negate(baseline)?, buffer)?;
    write_compressed_count(closure_count, buffer)?;

    for (index, closure) in closures.iter().enumerate() {
        check_positional(closure.closure_id, index, "closure id must be positional")?;
        write_compressed_count(relative_offset(closure.syntax_offset, baseline)?, buffer)?;
    }

    for (index, lambda) in lambdas.iter().enumerate() {
        check_positional(lambda.lambda_id, index, "lambda id must be positional")?;

        if lambda.closure_ordinal < LambdaDebugInfo::MIN_CLOSURE_ORDINAL
            || lambda.closure_ordinal >= closure_count
        {
            return Err(Error::ValueOutOfRange {
                value: i64::from(lambda.closure_ordinal),
                message: "lambda refers to a closure that does not exist",
            });
        }

        write_compressed_count(relative_offset(lambda.syntax_offset, baseline)?, buffer)?;
        write_compressed_count(
            lambda.closure_ordinal - LambdaDebugInfo::MIN_CLOSURE_ORDINAL,
            buffer,
        )?;
    }

    Ok(())
}

/// Decodes a lambda map into the method ordinal, closures and lambdas.
///
/// An empty map decodes to [`UNDEFINED_METHOD_ORDINAL`] without closures or lambdas.
///
/// # Errors
/// Returns [`crate::Error::InvalidData`] if the map is truncated or a lambda refers to a closure
/// that does not exist.
#[tracing::instrument(level = "trace", skip_all, fields(len = data.len()))]
pub fn deserialize_lambda_map(
    data: &[u8],
) -> Result<(i32, Vec<ClosureDebugInfo>, Vec<LambdaDebugInfo>)> {
    if data.is_empty() {
        return Ok((UNDEFINED_METHOD_ORDINAL, Vec::new(), Vec::new()));
    }

    let mut parser = Parser::new(data);
    read_lambda_map(&mut parser).map_err(|_| invalid_data(data, parser.pos()))
}

fn read_lambda_map(
    parser: &mut Parser,
) -> Result<(i32, Vec<ClosureDebugInfo>, Vec<LambdaDebugInfo>)> {
    let method_ordinal = to_i32(parser.read_compressed_uint()?) - 1;

    let mut closures = Vec::new();
    let mut lambdas = Vec::new();
    if !parser.has_more_data() {
        return Ok((method_ordinal, closures, lambdas));
    }

    let baseline = -to_i32(parser.read_compressed_uint()?);
    let closure_count = to_i32(parser.read_compressed_uint()?);

    for ordinal in 0..closure_count {
        let syntax_offset = to_i32(parser.read_compressed_uint()?) + baseline;
        closures.push(ClosureDebugInfo::new(syntax_offset, DebugId::new(ordinal, 0)));
    }

    let mut ordinal = 0;
    while parser.has_more_data() {
        let syntax_offset = to_i32(parser.read_compressed_uint()?) + baseline;
        let closure_ordinal =
            to_i32(parser.read_compressed_uint()?) + LambdaDebugInfo::MIN_CLOSURE_ORDINAL;

        if closure_ordinal >= closure_count {
            return Err(malformed_error!(
                "Lambda {} refers to closure {} of {}",
                ordinal,
                closure_ordinal,
                closure_count
            ));
        }

        lambdas.push(LambdaDebugInfo::new(
            syntax_offset,
            DebugId::new(ordinal, 0),
            closure_ordinal,
        ));
        ordinal += 1;
    }

    Ok((method_ordinal, closures, lambdas))
}

fn check_positional(id: DebugId, index: usize, message: &'static str) -> Result<()> {
    let expected = i32::try_from(index).ok().map(|ordinal| DebugId::new(ordinal, 0));
    if expected != Some(id) {
        return Err(Error::ValueOutOfRange {
            value: i64::from(id.ordinal),
            message,
        });
    }

    Ok(())
}
