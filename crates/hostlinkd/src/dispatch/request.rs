//! Request validation for framed bytes.

use hostlink_protocol::Request;
use serde_json::{Map, Value};

use super::errors::DispatchError;

/// Parses one frame into a request envelope.
///
/// An absent or `null` `params` becomes an empty object. Fields other than
/// `command` and `params` are ignored.
///
/// # Errors
///
/// Returns [`DispatchError::InvalidJson`] for unparseable bytes,
/// [`DispatchError::MissingCommand`] when the frame is not an object or its
/// `command` is absent or not a string, and [`DispatchError::InvalidParams`]
/// when `params` is neither an object nor `null`.
pub(crate) fn parse_request(frame: &[u8]) -> Result<Request, DispatchError> {
    let value: Value = serde_json::from_slice(frame).map_err(DispatchError::invalid_json)?;
    let Value::Object(mut fields) = value else {
        return Err(DispatchError::MissingCommand);
    };

    let command = match fields.remove("command") {
        Some(Value::String(command)) => command,
        _ => return Err(DispatchError::MissingCommand),
    };

    let params = match fields.remove("params") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(params)) => params,
        Some(_) => return Err(DispatchError::InvalidParams),
    };

    Ok(Request::new(command, params))
}
