//! SOAP transport for the ISPConfig remote API
//!
//! ISPConfig publishes its API as a WSDL-less SOAP 1.1 service using the
//! RPC/encoded style: every method takes positional parameters and answers
//! with a single return value. Associative arrays travel as Apache
//! `ns2:Map` structures, lists as `SOAP-ENC:Array`.
//!
//! # Request shape
//!
//! ```text
//! POST <soap_location>
//! SOAPAction: "<soap_uri>#sites_web_domain_get"
//!
//! <SOAP-ENV:Envelope ...>
//!   <SOAP-ENV:Body>
//!     <ns1:sites_web_domain_get>
//!       <param0 xsi:type="xsd:string">session-id</param0>
//!       <param1 xsi:type="ns2:Map">
//!         <item><key xsi:type="xsd:string">active</key><value xsi:type="xsd:string">y</value></item>
//!       </param1>
//!     </ns1:sites_web_domain_get>
//!   </SOAP-ENV:Body>
//! </SOAP-ENV:Envelope>
//! ```
//!
//! Responses are decoded into [`serde_json::Value`]; faults become
//! [`TransportError::Fault`].

use crate::config::IspConfigSettings;
use crate::ispconfig::transport::{Transport, TransportError};
use crate::ispconfig::types::RemoteCall;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Map, Number, Value};
use std::fmt::Display;
use std::time::Duration;
use tracing::debug;

const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const SOAP_ENC_NS: &str = "http://schemas.xmlsoap.org/soap/encoding/";
const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const APACHE_SOAP_NS: &str = "http://xml.apache.org/xml-soap";

/// Error bodies longer than this are cut before being put into an error.
const MAX_ERROR_BODY: usize = 512;

/// SOAP client bound to one ISPConfig endpoint.
pub struct SoapTransport {
    http: reqwest::Client,
    location: String,
    uri: String,
}

impl SoapTransport {
    /// Build the HTTP client. No network I/O happens here.
    pub fn new(settings: &IspConfigSettings) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if settings.timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(settings.timeout_seconds));
        }
        if !settings.verify_ssl {
            // Self-signed panel certificates
            builder = builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }

        Ok(Self {
            http: builder.build()?,
            location: settings.soap_location.clone(),
            uri: settings.soap_uri.clone(),
        })
    }
}

impl Transport for SoapTransport {
    async fn invoke(&self, call: &RemoteCall) -> Result<Value, TransportError> {
        let envelope = build_request(&self.uri, call)?;
        debug!("Invoking remote method {}", call.method);

        let response = self
            .http
            .post(&self.location)
            .header(reqwest::header::CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", format!("\"{}#{}\"", self.uri, call.method))
            .body(envelope)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let parsed = parse_response(&body);

        if status.is_success() {
            return parsed;
        }

        // Faults are delivered with HTTP 500; anything else is a plain HTTP failure
        match parsed {
            Err(fault @ TransportError::Fault { .. }) => Err(fault),
            _ => Err(TransportError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            }),
        }
    }
}

fn xml_error(e: impl Display) -> TransportError {
    TransportError::Xml(e.to_string())
}

/// Serialize a call into an RPC/encoded SOAP envelope.
pub fn build_request(uri: &str, call: &RemoteCall) -> Result<String, TransportError> {
    let mut writer = Writer::new(Vec::new());

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;

    let envelope = BytesStart::new("SOAP-ENV:Envelope").with_attributes([
        ("xmlns:SOAP-ENV", SOAP_ENV_NS),
        ("xmlns:ns1", uri),
        ("xmlns:xsd", XSD_NS),
        ("xmlns:xsi", XSI_NS),
        ("xmlns:ns2", APACHE_SOAP_NS),
        ("xmlns:SOAP-ENC", SOAP_ENC_NS),
        ("SOAP-ENV:encodingStyle", SOAP_ENC_NS),
    ]);
    writer
        .write_event(Event::Start(envelope))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Start(BytesStart::new("SOAP-ENV:Body")))
        .map_err(xml_error)?;

    let method = format!("ns1:{}", call.method);
    writer
        .write_event(Event::Start(BytesStart::new(method.as_str())))
        .map_err(xml_error)?;
    for (index, param) in call.params.iter().enumerate() {
        write_value(&mut writer, &format!("param{}", index), param)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(method.as_str())))
        .map_err(xml_error)?;

    writer
        .write_event(Event::End(BytesEnd::new("SOAP-ENV:Body")))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("SOAP-ENV:Envelope")))
        .map_err(xml_error)?;

    String::from_utf8(writer.into_inner()).map_err(xml_error)
}

fn write_value(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    value: &Value,
) -> Result<(), TransportError> {
    match value {
        Value::Null => {
            let element = BytesStart::new(name).with_attributes([("xsi:nil", "true")]);
            writer.write_event(Event::Empty(element)).map_err(xml_error)
        }
        Value::Bool(b) => {
            let text = if *b { "true" } else { "false" };
            write_scalar(writer, name, "xsd:boolean", text)
        }
        Value::Number(n) => {
            let xsi_type = if n.is_f64() { "xsd:float" } else { "xsd:int" };
            write_scalar(writer, name, xsi_type, &n.to_string())
        }
        Value::String(s) => write_scalar(writer, name, "xsd:string", s),
        Value::Array(items) => {
            let array_type = format!("xsd:anyType[{}]", items.len());
            let element = BytesStart::new(name).with_attributes([
                ("xsi:type", "SOAP-ENC:Array"),
                ("SOAP-ENC:arrayType", array_type.as_str()),
            ]);
            writer.write_event(Event::Start(element)).map_err(xml_error)?;
            for item in items {
                write_value(writer, "item", item)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(xml_error)
        }
        Value::Object(map) => {
            let element = BytesStart::new(name).with_attributes([("xsi:type", "ns2:Map")]);
            writer.write_event(Event::Start(element)).map_err(xml_error)?;
            for (key, item) in map {
                writer
                    .write_event(Event::Start(BytesStart::new("item")))
                    .map_err(xml_error)?;
                write_scalar(writer, "key", "xsd:string", key)?;
                write_value(writer, "value", item)?;
                writer
                    .write_event(Event::End(BytesEnd::new("item")))
                    .map_err(xml_error)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(xml_error)
        }
    }
}

fn write_scalar(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    xsi_type: &str,
    text: &str,
) -> Result<(), TransportError> {
    let element = BytesStart::new(name).with_attributes([("xsi:type", xsi_type)]);
    writer.write_event(Event::Start(element)).map_err(xml_error)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_error)
}

/// Minimal element tree; names and attribute keys are namespace-stripped.
#[derive(Debug, Default)]
struct Node {
    name: String,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn from_start(e: &BytesStart) -> Result<Self, TransportError> {
        let mut attrs = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(xml_error)?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value().map_err(xml_error)?.into_owned();
            attrs.push((key, value));
        }
        Ok(Self {
            name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
            attrs,
            ..Self::default()
        })
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    /// `xsi:type` with its namespace prefix removed.
    fn xsi_type(&self) -> Option<&str> {
        self.attr("type")
            .map(|t| t.rsplit_once(':').map_or(t, |(_, local)| local))
    }
}

fn parse_tree(xml: &str) -> Result<Node, TransportError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => stack.push(Node::from_start(e)?),
            Ok(Event::Empty(ref e)) => {
                let node = Node::from_start(e)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => root = Some(node),
                }
            }
            Ok(Event::Text(ref t)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&t.unescape().map_err(xml_error)?);
                }
            }
            Ok(Event::CData(ref c)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(c));
                }
            }
            Ok(Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| xml_error("unbalanced closing tag"))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => root = Some(node),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(xml_error(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    root.ok_or_else(|| xml_error("empty document"))
}

/// Decode a SOAP response body into the method's return value.
pub fn parse_response(xml: &str) -> Result<Value, TransportError> {
    let envelope = parse_tree(xml)?;
    if envelope.name != "Envelope" {
        return Err(xml_error(format!("unexpected root element <{}>", envelope.name)));
    }

    let body = envelope
        .child("Body")
        .ok_or_else(|| xml_error("missing SOAP Body"))?;
    let payload = body
        .children
        .first()
        .ok_or_else(|| xml_error("empty SOAP Body"))?;

    if payload.name == "Fault" {
        let text_of = |name: &str| payload.child(name).map(|n| n.text.clone());
        return Err(TransportError::Fault {
            code: text_of("faultcode").unwrap_or_else(|| "Server".to_string()),
            message: text_of("faultstring").unwrap_or_else(|| "Unknown error".to_string()),
        });
    }

    Ok(payload.children.first().map(decode_value).unwrap_or(Value::Null))
}

fn decode_value(node: &Node) -> Value {
    if matches!(node.attr("nil"), Some("true") | Some("1")) {
        return Value::Null;
    }

    match node.xsi_type() {
        Some("Map") => decode_map(node),
        Some("Array") => Value::Array(node.children.iter().map(decode_value).collect()),
        Some("Struct") => decode_struct(node),
        _ if !node.children.is_empty() => {
            if node.children.iter().all(is_map_entry) {
                decode_map(node)
            } else if node.children.iter().all(|c| c.name == "item") {
                Value::Array(node.children.iter().map(decode_value).collect())
            } else {
                decode_struct(node)
            }
        }
        Some(xsi_type) => decode_scalar(xsi_type, &node.text),
        None => Value::String(node.text.clone()),
    }
}

fn is_map_entry(node: &Node) -> bool {
    node.name == "item" && node.child("key").is_some()
}

fn decode_map(node: &Node) -> Value {
    let mut map = Map::new();
    for item in &node.children {
        let Some(key) = item.child("key") else {
            continue;
        };
        let value = item.child("value").map(decode_value).unwrap_or(Value::Null);
        map.insert(key.text.clone(), value);
    }
    Value::Object(map)
}

fn decode_struct(node: &Node) -> Value {
    let map = node
        .children
        .iter()
        .map(|child| (child.name.clone(), decode_value(child)))
        .collect();
    Value::Object(map)
}

fn decode_scalar(xsi_type: &str, text: &str) -> Value {
    match xsi_type {
        "int" | "integer" | "long" | "short" | "byte" | "unsignedInt" | "unsignedLong"
        | "unsignedShort" | "unsignedByte" => text
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(text.to_string())),
        "float" | "double" | "decimal" => text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(text.to_string())),
        "boolean" => Value::Bool(matches!(text, "true" | "1")),
        _ => Value::String(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wrap(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/" xmlns:ns1="https://panel/remote/" xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:ns2="http://xml.apache.org/xml-soap" xmlns:SOAP-ENC="http://schemas.xmlsoap.org/soap/encoding/">
<SOAP-ENV:Body>{}</SOAP-ENV:Body></SOAP-ENV:Envelope>"#,
            body
        )
    }

    #[test]
    fn test_untyped_item_children_decode_as_array() {
        let xml = wrap(
            "<ns1:fooResponse><return><item>a</item><item>b</item></return></ns1:fooResponse>",
        );
        assert_eq!(parse_response(&xml).unwrap(), json!(["a", "b"]));
    }

    #[test]
    fn test_struct_without_type_decodes_by_child_name() {
        let xml = wrap(
            "<ns1:fooResponse><return><domain>example.com</domain>\
             <server_id xsi:type=\"xsd:int\">2</server_id></return></ns1:fooResponse>",
        );
        assert_eq!(
            parse_response(&xml).unwrap(),
            json!({"domain": "example.com", "server_id": 2})
        );
    }

    #[test]
    fn test_response_without_return_is_null() {
        let xml = wrap("<ns1:logoutResponse/>");
        assert_eq!(parse_response(&xml).unwrap(), Value::Null);
    }

    #[test]
    fn test_non_envelope_root_is_rejected() {
        let result = parse_response("<html><body>Bad gateway</body></html>");
        assert!(matches!(result, Err(TransportError::Xml(_))));
    }

    #[test]
    fn test_bad_numeric_text_falls_back_to_string() {
        assert_eq!(decode_scalar("int", "n/a"), json!("n/a"));
        assert_eq!(decode_scalar("double", "1.25"), json!(1.25));
    }
}
