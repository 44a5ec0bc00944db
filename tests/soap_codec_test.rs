//! SOAP envelope encoding and decoding tests
//!
//! Fixtures follow the RPC/encoded shape the panel's remote API produces:
//! lists as `SOAP-ENC:Array` of `item`, records as `ns2:Map` key/value pairs.

use ispconfig_zabbix::ispconfig::soap::{build_request, parse_response};
use ispconfig_zabbix::ispconfig::{RemoteCall, TransportError};
use serde_json::json;

const URI: &str = "https://panel.example.com:8080/remote/";

fn envelope(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/"
    xmlns:ns1="https://panel.example.com:8080/remote/"
    xmlns:xsd="http://www.w3.org/2001/XMLSchema"
    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
    xmlns:ns2="http://xml.apache.org/xml-soap"
    xmlns:SOAP-ENC="http://schemas.xmlsoap.org/soap/encoding/"
    SOAP-ENV:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
  <SOAP-ENV:Body>{}</SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#,
        body
    )
}

#[test]
fn test_request_carries_method_and_ordered_params() {
    // Given: A listing call with session and filter
    let call = RemoteCall::new("sites_web_domain_get")
        .arg(json!({"active": "y"}))
        .with_session("abc123");

    // When: Building the envelope
    let xml = build_request(URI, &call).unwrap();

    // Then: The method element is namespaced and params are positional
    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains(r#"xmlns:ns1="https://panel.example.com:8080/remote/""#));
    assert!(xml.contains("<ns1:sites_web_domain_get>"));
    assert!(xml.contains(r#"<param0 xsi:type="xsd:string">abc123</param0>"#));
    assert!(xml.contains(r#"<param1 xsi:type="ns2:Map">"#));
    assert!(xml.contains(r#"<key xsi:type="xsd:string">active</key>"#));
    assert!(xml.contains(r#"<value xsi:type="xsd:string">y</value>"#));
    assert!(xml.find("param0").unwrap() < xml.find("param1").unwrap());
}

#[test]
fn test_request_encodes_scalars_and_escapes_text() {
    let call = RemoteCall::new("login").args(vec![
        json!("admin"),
        json!("p<a>&ss"),
        json!(42),
        json!(true),
        json!(null),
    ]);

    let xml = build_request(URI, &call).unwrap();

    assert!(xml.contains("p&lt;a&gt;&amp;ss"));
    assert!(xml.contains(r#"<param2 xsi:type="xsd:int">42</param2>"#));
    assert!(xml.contains(r#"<param3 xsi:type="xsd:boolean">true</param3>"#));
    assert!(xml.contains(r#"<param4 xsi:nil="true"/>"#));
}

#[test]
fn test_login_response_decodes_session_string() {
    let xml = envelope(
        r#"<ns1:loginResponse><return xsi:type="xsd:string">5e4f3a2b1c</return></ns1:loginResponse>"#,
    );

    assert_eq!(parse_response(&xml).unwrap(), json!("5e4f3a2b1c"));
}

#[test]
fn test_record_list_decodes_to_maps() {
    // Given: A two-record listing with mixed value types
    let xml = envelope(
        r#"<ns1:sites_web_domain_getResponse>
  <return SOAP-ENC:arrayType="ns2:Map[2]" xsi:type="SOAP-ENC:Array">
    <item xsi:type="ns2:Map">
      <item><key xsi:type="xsd:string">domain_id</key><value xsi:type="xsd:string">1</value></item>
      <item><key xsi:type="xsd:string">domain</key><value xsi:type="xsd:string">example.com</value></item>
      <item><key xsi:type="xsd:string">traffic_quota</key><value xsi:type="xsd:int">-1</value></item>
      <item><key xsi:type="xsd:string">backup_copies</key><value xsi:nil="true"/></item>
    </item>
    <item xsi:type="ns2:Map">
      <item><key xsi:type="xsd:string">domain_id</key><value xsi:type="xsd:string">2</value></item>
      <item><key xsi:type="xsd:string">domain</key><value xsi:type="xsd:string">example.org &amp; co</value></item>
    </item>
  </return>
</ns1:sites_web_domain_getResponse>"#,
    );

    // When: Parsing the response
    let value = parse_response(&xml).unwrap();

    // Then: Records keep their field order and types
    assert_eq!(
        value,
        json!([
            {"domain_id": "1", "domain": "example.com", "traffic_quota": -1, "backup_copies": null},
            {"domain_id": "2", "domain": "example.org & co"}
        ])
    );
    let keys: Vec<&String> = value[0].as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["domain_id", "domain", "traffic_quota", "backup_copies"]);
}

#[test]
fn test_empty_array_and_boolean_results() {
    let empty = envelope(
        r#"<ns1:mail_user_getResponse><return SOAP-ENC:arrayType="xsd:anyType[0]" xsi:type="SOAP-ENC:Array"/></ns1:mail_user_getResponse>"#,
    );
    let flag = envelope(
        r#"<ns1:logoutResponse><return xsi:type="xsd:boolean">true</return></ns1:logoutResponse>"#,
    );

    assert_eq!(parse_response(&empty).unwrap(), json!([]));
    assert_eq!(parse_response(&flag).unwrap(), json!(true));
}

#[test]
fn test_fault_is_reported_with_code_and_message() {
    let xml = envelope(
        r#"<SOAP-ENV:Fault><faultcode>session_does_not_exist</faultcode><faultstring>The Session is expired or does not exist.</faultstring></SOAP-ENV:Fault>"#,
    );

    let err = parse_response(&xml).unwrap_err();

    match &err {
        TransportError::Fault { code, message } => {
            assert_eq!(code, "session_does_not_exist");
            assert_eq!(message, "The Session is expired or does not exist.");
        }
        other => panic!("expected fault, got {:?}", other),
    }
    assert!(err.is_session_error());
}

#[test]
fn test_malformed_xml_is_an_xml_error() {
    let err = parse_response("<SOAP-ENV:Envelope><SOAP-ENV:Body>").unwrap_err();

    assert!(matches!(err, TransportError::Xml(_)));
    assert!(!err.is_session_error());
}
