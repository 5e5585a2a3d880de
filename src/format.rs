use std::fmt;

use crate::raw::{scalar_text, RawEvent};

/// The API Gateway payload format an event is encoded in.
///
/// ALB events carry no `version` field and use the 1.0 layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// REST API and ALB layout (`httpMethod`, `path`, multi-value maps)
    V1,
    /// HTTP API layout (`rawPath`, `rawQueryString`, `cookies`)
    V2,
}

impl PayloadFormat {
    /// Detects the format from the `version` field.
    ///
    /// A missing version means 1.0. A version that is not a number falls
    /// back to whichever method field the event carries.
    pub(crate) fn detect(event: &RawEvent) -> Self {
        let Some(version) = event.get("/version").and_then(scalar_text) else {
            return PayloadFormat::V1;
        };

        match version.trim().parse::<f64>() {
            Ok(v) if v == 2.0 => PayloadFormat::V2,
            Ok(_) => PayloadFormat::V1,
            Err(_) => {
                if !event.contains("/httpMethod") && event.contains("/requestContext/http/method") {
                    PayloadFormat::V2
                } else {
                    PayloadFormat::V1
                }
            }
        }
    }

    /// Returns `true` for the 2.0 format.
    pub fn is_v2(self) -> bool {
        self == PayloadFormat::V2
    }
}

impl fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadFormat::V1 => write!(f, "1.0"),
            PayloadFormat::V2 => write!(f, "2.0"),
        }
    }
}
