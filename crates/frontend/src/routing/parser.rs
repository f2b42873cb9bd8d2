//! Location fragment → route segments + route options

use super::route::Route;
use crate::config::RouterConfig;
use serde_json::{Map, Value};
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRoute {
    Route {
        route: Route,
        /// Parsed from a query string on the last segment.
        options: Map<String, Value>,
    },
    /// Legacy alias: navigate here instead and drop this dispatch.
    Redirect(Route),
}

/// Drop a leading `#` and then a leading `!`.
pub fn strip_prefix(fragment: &str) -> &str {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    fragment.strip_prefix('!').unwrap_or(fragment)
}

/// Percent-decode one segment; malformed input passes through unchanged.
pub fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| segment.to_string())
}

/// Decoded, prefix-stripped form of a location used as a map key.
pub fn decode_route_str(fragment: &str) -> String {
    decode_segment(strip_prefix(fragment))
}

/// Segments containing `%`, `'` or `"` are encoded before joining.
pub fn encode_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains(['%', '\'', '"']) {
        urlencoding::encode(segment)
    } else {
        Cow::Borrowed(segment)
    }
}

/// `k=v&k2=v2` pairs, each decoded on its own. A repeated key keeps its
/// last value; a pair without a key is skipped.
pub fn parse_query(query: &str) -> Map<String, Value> {
    let mut options = Map::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_query_part(key);
        if key.is_empty() {
            log::warn!("ignoring route query pair '{}'", pair);
            continue;
        }
        options.insert(key, Value::String(decode_query_part(value)));
    }
    options
}

fn decode_query_part(part: &str) -> String {
    decode_segment(&part.replace('+', " "))
}

/// Split a fragment into decoded segments and query options.
///
/// An empty fragment is the empty route.
pub fn split_fragment(fragment: &str) -> (Route, Map<String, Value>) {
    let fragment = strip_prefix(fragment);
    if fragment.is_empty() {
        return (Route::default(), Map::new());
    }

    let mut parts: Vec<&str> = fragment.split('/').collect();
    let mut options = Map::new();
    if let Some(last) = parts.last_mut() {
        if let Some((rest, query)) = last.split_once('?') {
            *last = rest;
            options = parse_query(query);
        }
    }
    let segments = parts.into_iter().map(decode_segment).collect();
    (Route::new(segments), options)
}

pub fn parse(fragment: &str, config: &RouterConfig) -> ParsedRoute {
    let (route, options) = split_fragment(fragment);
    if route.kind() == Some(config.legacy_module_alias.as_str()) {
        let mut target = vec![config.modules_route.clone()];
        if let Some(module) = route.get(1) {
            target.push(module.to_string());
        }
        log::debug!("legacy route {} redirected", route);
        return ParsedRoute::Redirect(Route::new(target));
    }
    ParsedRoute::Route { route, options }
}
