use crate::rpc::response::error::RpcError;
use actix_web::web::Bytes;
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures::future::{FutureExt, LocalBoxFuture};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::ops::Deref;

/// Procedure input decoded from the JSON request body.
///
/// An empty body or `null` means "no input" and yields `T::default()`, so
/// every field falls back to its default. Anything else must be a JSON
/// object that deserializes into `T`; the request is rejected with 400
/// before the handler runs otherwise.
#[derive(Debug, Clone)]
pub struct RpcInput<T>(pub T);

impl<T> RpcInput<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for RpcInput<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> FromRequest for RpcInput<T>
where
    T: DeserializeOwned + Default + 'static,
{
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let body = Bytes::from_request(req, payload);
        async move {
            let body = body.await?;
            let input = parse_input::<T>(&body)?;
            Ok(RpcInput(input))
        }
        .boxed_local()
    }
}

pub fn parse_input<T>(body: &[u8]) -> Result<T, RpcError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| RpcError::BadRequest(format!("Invalid input: malformed JSON: {}", e)))?;
    match value {
        Value::Null => Ok(T::default()),
        Value::Object(mut fields) => {
            for field in fields.values_mut() {
                if let Some(n) = whole_number(field) {
                    *field = Value::from(n);
                }
            }
            serde_json::from_value(Value::Object(fields))
                .map_err(|e| RpcError::BadRequest(format!("Invalid input: {}", e)))
        }
        _ => Err(RpcError::BadRequest(
            "Invalid input: expected a JSON object".to_string(),
        )),
    }
}

/// `2.0` and `1e3` are integers to a JSON client; fractional or out of range
/// floats are left alone and fail to deserialize.
fn whole_number(value: &Value) -> Option<i64> {
    let f = value.as_f64().filter(|_| value.is_f64())?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}
