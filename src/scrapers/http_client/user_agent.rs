//! User agent selection for RangeInfo requests.

/// Default user agent. The RangeInfo service rejects obvious bot agents, so
/// the harvester presents itself as a desktop browser.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Resolve the configured agent: `None` or a blank value is [`USER_AGENT`],
/// anything else is used verbatim.
pub fn resolve_user_agent(config: Option<&str>) -> String {
    match config.map(str::trim) {
        None | Some("") => USER_AGENT.to_string(),
        Some(custom) => custom.to_string(),
    }
}
