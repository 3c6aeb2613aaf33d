/// Extract the token from an `Authorization` header value.
///
/// The value must be exactly `Bearer <token>`: one single space, scheme matched
/// case-sensitively, non-empty token. Anything else (including an absent
/// header) yields `None`.
pub fn extract_bearer_token(header: Option<&str>) -> Option<&str> {
    let mut parts = header?.split(' ');

    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}
