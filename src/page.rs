//! Static info page.
//!
//! Served for every request that is not a WebSocket upgrade on a routed
//! path. The page is a small interactive client: pick a route, type a
//! message (or choose a file for the binary routes) and watch the echo.
//!
//! The route list and the WebSocket base URL are baked into the HTML when
//! the page is rendered.

// ============================================================================
// Imports
// ============================================================================

use serde_json::{Map, Value};

use crate::transport::RouteTable;

// ============================================================================
// Public Functions
// ============================================================================

/// Renders the info page.
///
/// # Arguments
///
/// * `ws_base` - WebSocket base URL without path (e.g., "ws://localhost:23456")
/// * `routes` - Routes offered in the path selector
#[must_use]
pub fn render(ws_base: &str, routes: &RouteTable) -> String {
    let options = build_options(routes);
    let routes_json = build_routes_json(routes);
    let ws_base = escape_html(ws_base);

    fill(
        PAGE_TEMPLATE,
        &[
            ("$ROUTE_OPTIONS", &options),
            ("$ROUTES_JSON", &routes_json),
            ("$WS_BASE", &ws_base),
        ],
    )
}

// ============================================================================
// Internal Functions
// ============================================================================

/// Replaces `$NAME` placeholders in a single pass.
///
/// Substituted values are copied verbatim and never scanned again, so a
/// value containing a placeholder name stays literal.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('$') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match values.iter().find(|(name, _)| tail.starts_with(name)) {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len()..];
            }
            None => {
                out.push('$');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Builds the `<option>` list, first route selected.
fn build_options(routes: &RouteTable) -> String {
    routes
        .iter()
        .enumerate()
        .map(|(i, route)| {
            let path = escape_html(&route.path);
            let selected = if i == 0 { " selected" } else { "" };
            format!("<option value=\"{path}\"{selected}>{path}</option>")
        })
        .collect::<Vec<_>>()
        .join("\n            ")
}

/// Builds the `{ path: framing }` object the page script reads.
fn build_routes_json(routes: &RouteTable) -> String {
    let map: Map<String, Value> = routes
        .iter()
        .map(|route| (route.path.clone(), Value::from(route.framing.name())))
        .collect();

    // Keeps a path like "</script>" from ending the script block early.
    Value::Object(map).to_string().replace("</", "<\\/")
}

/// Escapes text for an HTML attribute or element body.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// Constants
// ============================================================================

/// HTML template for the info page.
const PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>WebSocket Echo</title>
    <style>
        body {
            background: #1a1a2e;
            color: #ccc;
            font-family: monospace;
            padding: 40px;
            line-height: 1.6;
        }
        h1 { color: #e94560; margin-bottom: 20px; }
        .key { color: #4ade80; font-weight: bold; }
        #log { white-space: pre-wrap; border-top: 1px dashed #333; margin-top: 20px; padding-top: 10px; }
    </style>
</head>
<body>
    <h1>WebSocket Echo</h1>
    <div><span class="key">WS_BASE:</span> <span id="base">$WS_BASE</span></div>
    <form name="echo" action="#">
        <select name="path">
            $ROUTE_OPTIONS
        </select>
        <input type="text" name="message" size="80" value="">
        <input type="file" name="file">
        <input type="submit" value="send">
    </form>
    <div id="log"></div>
    <script>
    const ROUTES = $ROUTES_JSON;
    const form = document.forms.echo;
    const log = document.getElementById("log");
    let ws = null;
    let path = null;

    function show(line) {
        log.textContent = line + "\n" + log.textContent;
    }

    function describe(data) {
        if (data instanceof ArrayBuffer) {
            return "ArrayBuffer: " + data.byteLength + " [" + Array.from(new Uint8Array(data)).join(" ") + "]";
        }
        if (data instanceof Blob) {
            return "Blob: " + data.size + " bytes";
        }
        return data;
    }

    function connect() {
        if (ws !== null) {
            ws.close();
        }
        path = form.path.value;
        show("path: " + path);
        ws = new WebSocket(document.getElementById("base").textContent + path);
        if (ROUTES[path] === "binary") {
            ws.binaryType = path.endsWith("Blob") ? "blob" : "arraybuffer";
        }
        ws.onopen = () => show("opened");
        ws.onmessage = (e) => show("msg: " + describe(e.data));
        ws.onclose = (e) => show("closed " + e.code + (e.reason ? " " + e.reason : ""));
    }

    function send(event) {
        event.preventDefault();
        let message = form.message.value;
        if (ROUTES[path] === "binary") {
            if (message !== "") {
                message = new TextEncoder().encode(message).buffer;
            } else if (form.file.files.length > 0) {
                message = form.file.files[0];
            }
        } else if (ROUTES[path] === "json") {
            message = JSON.stringify({ Msg: message, Path: path });
        }
        show("send: " + describe(message));
        ws.send(message);
    }

    form.path.addEventListener("change", connect);
    form.addEventListener("submit", send);
    connect();
    </script>
</body>
</html>
"##;

// ============================================================================
// Tests
// ============================================================================
