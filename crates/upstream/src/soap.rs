//! SOAP envelope assembly and response dissection for the Toolkit API.
//!
//! SOAP failures are usually communicated inside the response body rather
//! than through the HTTP status, so extraction always scans every
//! `<STATUS><CODE>` element: a missing, non-numeric or non-zero code is a
//! failure even when the transport reported 2xx.

use std::io::Cursor;

use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

use datagate_core::credentials::Credentials;
use datagate_core::errors::{HubError, Result};

/// Element wrapping the orderable payload inside the SOAP response.
const PAYLOAD_ELEMENT: &[u8] = b"DGX";

/// Renders the order envelope for one product request.
pub fn order_envelope(
    credentials: &Credentials,
    key: &str,
    product_name: &str,
    transaction_id: &str,
) -> String {
    format!(
        concat!(
            r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" "#,
            r#"xmlns:wsp="http://www.dnb.com/DNB_WebServices/Providers/OrderAndInvestigations/GDP_V4/wsp_GDP_V4">"#,
            "<soapenv:Header/><soapenv:Body><wsp:ws_OtherGDPProducts>",
            "<GDPRequest>",
            "<UserId>{user}</UserId>",
            "<Password>{password}</Password>",
            "<TRNUID>{transaction_id}</TRNUID>",
            "<socCode><AppId>datagate</AppId><AppVer>0010</AppVer></socCode>",
            "<Orders>",
            "<User_Language>EN</User_Language>",
            "<DnB_DUNS_Number>{key}</DnB_DUNS_Number>",
            "<Trade_Up_Indicator>Y</Trade_Up_Indicator>",
            "<Product>{product_name}</Product>",
            "<Product_Type>D</Product_Type>",
            "<Reason_Code>1</Reason_Code>",
            "</Orders>",
            "<Immediate_Delivery>",
            "<Mode>DIRECT</Mode>",
            "<Format>XML</Format>",
            "</Immediate_Delivery>",
            "</GDPRequest>",
            "</wsp:ws_OtherGDPProducts></soapenv:Body>",
            "</soapenv:Envelope>",
        ),
        user = credentials.username,
        password = credentials.password,
        transaction_id = transaction_id,
        key = key,
        product_name = product_name,
    )
}

/// Strips the SOAP envelope from a response and returns the inner payload
/// fragment re-serialized as XML text, after verifying every embedded
/// status code.
pub fn extract_payload(document: &str) -> Result<String> {
    let fragment = extract_fragment(document)?;
    scan_status_codes(&fragment)?;
    Ok(fragment)
}

fn xml_error<E: std::fmt::Display>(e: E) -> HubError {
    HubError::Generic(format!("failed to process the SOAP response: {e}"))
}

fn body_status_error(code: Option<&str>, fragment: &str) -> HubError {
    let code = code.unwrap_or("none");
    HubError::UpstreamBody {
        detail: format!("order request returned an error status code (code: {code})"),
        body: Some(fragment.to_string()),
    }
}

/// Copies the first `<DGX>` element and everything below it into a fresh
/// XML string.
fn extract_fragment(document: &str) -> Result<String> {
    let mut reader = Reader::from_str(document);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut depth = 0usize;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => {
                if depth > 0 {
                    depth += 1;
                    writer.write_event(Event::Start(e)).map_err(xml_error)?;
                } else if e.local_name().as_ref() == PAYLOAD_ELEMENT {
                    depth = 1;
                    writer.write_event(Event::Start(e)).map_err(xml_error)?;
                }
            }
            Event::End(e) => {
                if depth > 0 {
                    writer.write_event(Event::End(e)).map_err(xml_error)?;
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
            }
            Event::Empty(e) => {
                if depth > 0 {
                    writer.write_event(Event::Empty(e)).map_err(xml_error)?;
                } else if e.local_name().as_ref() == PAYLOAD_ELEMENT {
                    writer.write_event(Event::Empty(e)).map_err(xml_error)?;
                    break;
                }
            }
            Event::Text(t) => {
                if depth > 0 {
                    writer.write_event(Event::Text(t)).map_err(xml_error)?;
                }
            }
            Event::CData(c) => {
                if depth > 0 {
                    writer.write_event(Event::CData(c)).map_err(xml_error)?;
                }
            }
            Event::Eof => {
                return Err(HubError::UpstreamBody {
                    detail: "payload element missing from the SOAP response".to_string(),
                    body: Some(document.to_string()),
                });
            }
            _ => {}
        }
    }

    String::from_utf8(writer.into_inner().into_inner()).map_err(xml_error)
}

/// Checks the first `<CODE>` of every `<STATUS>` element in the fragment.
fn scan_status_codes(fragment: &str) -> Result<()> {
    let mut reader = Reader::from_str(fragment);
    // One entry per open STATUS element: whether its code was checked yet.
    let mut open_statuses: Vec<bool> = Vec::new();
    let mut in_code = false;
    let mut code_text = String::new();

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"STATUS" => open_statuses.push(false),
                b"CODE" if !open_statuses.is_empty() && !in_code => {
                    in_code = true;
                    code_text.clear();
                }
                _ => {}
            },
            Event::Text(t) => {
                if in_code {
                    code_text.push_str(&t.unescape().map_err(xml_error)?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"CODE" if in_code => {
                    in_code = false;
                    if let Some(checked) = open_statuses.last_mut() {
                        if !*checked {
                            *checked = true;
                            check_code(&code_text, fragment)?;
                        }
                    }
                }
                b"STATUS" => {
                    if let Some(checked) = open_statuses.pop() {
                        if !checked {
                            return Err(body_status_error(None, fragment));
                        }
                    }
                }
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"CODE" if !open_statuses.is_empty() => {
                    if let Some(checked) = open_statuses.last_mut() {
                        if !*checked {
                            *checked = true;
                            return Err(body_status_error(None, fragment));
                        }
                    }
                }
                b"STATUS" => return Err(body_status_error(None, fragment)),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(())
}

fn check_code(text: &str, fragment: &str) -> Result<()> {
    let trimmed = text.trim();
    match trimmed.parse::<i64>() {
        Ok(0) => Ok(()),
        Ok(_) | Err(_) => Err(body_status_error(Some(trimmed), fragment)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(inner: &str) -> String {
        format!(
            concat!(
                r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">"#,
                "<soapenv:Body><wsp:ws_OtherGDPProductsResponse>{inner}",
                "</wsp:ws_OtherGDPProductsResponse></soapenv:Body></soapenv:Envelope>",
            ),
            inner = inner
        )
    }

    #[test]
    fn successful_response_yields_the_stripped_payload_fragment() {
        let document = wrap(
            "<DGX><TRNUID>AB12</TRNUID><STATUS><CODE>0</CODE></STATUS>\
             <COMPANY><NAME>ACME Corp</NAME></COMPANY></DGX>",
        );

        let fragment = extract_payload(&document).unwrap();

        assert!(fragment.starts_with("<DGX>"));
        assert!(fragment.ends_with("</DGX>"));
        assert!(fragment.contains("<NAME>ACME Corp</NAME>"));
        assert!(!fragment.contains("soapenv"));
    }

    #[test]
    fn non_zero_status_code_fails_despite_http_success() {
        let document = wrap("<DGX><STATUS><CODE>7</CODE></STATUS></DGX>");

        let error = extract_payload(&document).unwrap_err();
        match error {
            HubError::UpstreamBody { detail, body } => {
                assert!(detail.contains("(code: 7)"));
                assert!(body.unwrap().contains("<CODE>7</CODE>"));
            }
            other => panic!("expected an in-body upstream error, got {other:?}"),
        }
        // No HTTP status attached: resolution falls back to the kind default.
        let error = extract_payload(&document).unwrap_err();
        assert_eq!(error.upstream_status(), None);
        assert_eq!(error.http_status(), 500);
    }

    #[test]
    fn every_status_element_is_checked() {
        let document = wrap(
            "<DGX><STATUS><CODE>0</CODE></STATUS>\
             <ORDER><STATUS><CODE>12</CODE></STATUS></ORDER></DGX>",
        );

        let error = extract_payload(&document).unwrap_err();
        assert!(matches!(error, HubError::UpstreamBody { .. }));
    }

    #[test]
    fn status_without_a_code_is_a_failure() {
        let document = wrap("<DGX><STATUS><SEVERITY>HIGH</SEVERITY></STATUS></DGX>");

        let error = extract_payload(&document).unwrap_err();
        match error {
            HubError::UpstreamBody { detail, .. } => assert!(detail.contains("(code: none)")),
            other => panic!("expected an in-body upstream error, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_code_is_a_failure() {
        let document = wrap("<DGX><STATUS><CODE>OK</CODE></STATUS></DGX>");
        assert!(extract_payload(&document).is_err());
    }

    #[test]
    fn missing_payload_element_is_a_failure() {
        let document = wrap("<SOMETHING_ELSE/>");

        let error = extract_payload(&document).unwrap_err();
        match error {
            HubError::UpstreamBody { detail, .. } => {
                assert!(detail.contains("payload element missing"));
            }
            other => panic!("expected an in-body upstream error, got {other:?}"),
        }
    }

    #[test]
    fn envelope_carries_credentials_key_and_product_name() {
        let credentials = Credentials::new("svc-user", "svc-pwd");
        let envelope = order_envelope(&credentials, "000123456", "Enterprise Management", "A1B2C3D4E5F6");

        assert!(envelope.contains("<UserId>svc-user</UserId>"));
        assert!(envelope.contains("<Password>svc-pwd</Password>"));
        assert!(envelope.contains("<TRNUID>A1B2C3D4E5F6</TRNUID>"));
        assert!(envelope.contains("<DnB_DUNS_Number>000123456</DnB_DUNS_Number>"));
        assert!(envelope.contains("<Product>Enterprise Management</Product>"));
        assert!(envelope.contains("<Mode>DIRECT</Mode>"));
        assert!(envelope.starts_with("<soapenv:Envelope"));
    }
}
