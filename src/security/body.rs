//! Request body construction.

use crate::error::SignError;

/// Capacity of a serialized request body.
pub const REQUEST_BODY_SIZE: usize = 512;

/// Serialized request body.
pub type RequestBody = heapless::String<REQUEST_BODY_SIZE>;

/// Build a flat JSON object from ordered key/value lists.
///
/// Produces `{"k1":"v1","k2":"v2"}` in list order. Values are inserted
/// verbatim: a value containing `"` yields malformed JSON. Callers only pass
/// digits, hex digests and fixed tags.
///
/// Fails with [`SignError::FieldMismatch`] if the lists differ in length and
/// [`SignError::BufferFull`] if the result exceeds `N`; nothing is returned on
/// failure.
pub fn build_body<const N: usize>(
    keys: &[&str],
    values: &[&str],
) -> Result<heapless::String<N>, SignError> {
    if keys.len() != values.len() {
        return Err(SignError::FieldMismatch {
            keys: keys.len(),
            values: values.len(),
        });
    }

    let mut out = heapless::String::<N>::new();
    push(&mut out, "{")?;

    for (i, (key, value)) in keys.iter().zip(values).enumerate() {
        if i > 0 {
            push(&mut out, ",")?;
        }
        push(&mut out, "\"")?;
        push(&mut out, key)?;
        push(&mut out, "\":\"")?;
        push(&mut out, value)?;
        push(&mut out, "\"")?;
    }

    push(&mut out, "}")?;
    Ok(out)
}

fn push<const N: usize>(out: &mut heapless::String<N>, s: &str) -> Result<(), SignError> {
    out.push_str(s).map_err(|_| SignError::BufferFull)
}
