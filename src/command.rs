/// Picks the lookup target out of a raw chat message such as `"ip 1.1.1.1"`.
///
/// With more than one token the last one is the target. A bare command, or the command
/// word repeated (`"ip ip"`), yields an empty target so the provider reports the caller's
/// own address. The target is not validated.
pub fn target_ip<'a>(message: &'a str, command: &str) -> &'a str {
    match message.split_whitespace().skip(1).last() {
        Some(token) if !token.eq_ignore_ascii_case(command) => token,
        _ => "",
    }
}
