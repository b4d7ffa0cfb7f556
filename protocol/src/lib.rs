use seqmaster_core::{ApiRequest, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use error::*;
pub use wire::*;

mod error;
mod wire;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub method: Method,
    pub path: &'static str,
}

impl Endpoint {
    const fn get(path: &'static str) -> Self {
        Self {
            method: Method::Get,
            path,
        }
    }

    const fn post(path: &'static str) -> Self {
        Self {
            method: Method::Post,
            path,
        }
    }

    pub const MODE: Self = Self::post("/api/mode");
    pub const CHALLENGE: Self = Self::get("/api/challenge");
    pub const ANSWER: Self = Self::post("/api/answer");
    pub const LAST_ANSWER: Self = Self::get("/api/last_answer");
    pub const LEADERBOARD: Self = Self::get("/api/leaderboard");
    pub const SUBMIT_SCORE: Self = Self::post("/api/submit_score");
    pub const RESET: Self = Self::post("/api/reset");
    pub const SHOP_STATUS: Self = Self::get("/api/shop/status");
    pub const SHOP_PURCHASE: Self = Self::post("/api/shop/purchase");
    pub const BOSS_START: Self = Self::post("/api/boss/start");
    pub const BOSS_ANSWER: Self = Self::post("/api/boss/answer");
    pub const STATS: Self = Self::get("/api/stats");
    pub const ACHIEVEMENTS: Self = Self::get("/api/achievements");

    pub fn for_request(request: &ApiRequest) -> Self {
        match request {
            ApiRequest::SetMode(_) => Self::MODE,
            ApiRequest::Challenge => Self::CHALLENGE,
            ApiRequest::Answer(_) => Self::ANSWER,
            ApiRequest::LastAnswer(_) => Self::LAST_ANSWER,
            ApiRequest::Reset => Self::RESET,
            ApiRequest::ShopStatus => Self::SHOP_STATUS,
            ApiRequest::Purchase(_) => Self::SHOP_PURCHASE,
            ApiRequest::BossStart => Self::BOSS_START,
            ApiRequest::BossAnswer(_) => Self::BOSS_ANSWER,
        }
    }
}

/// JSON body to send along with `request`, if its endpoint takes one.
pub fn request_body(request: &ApiRequest) -> Result<Option<String>, ProtocolError> {
    let body = match request {
        ApiRequest::SetMode(mode) => serde_json::to_string(&ModeRequest { mode: *mode })?,
        ApiRequest::Answer(answer) | ApiRequest::BossAnswer(answer) => {
            serde_json::to_string(&AnswerRequest { answer })?
        }
        ApiRequest::Purchase(power_up) => serde_json::to_string(&PurchaseRequest {
            power_up: *power_up,
        })?,
        ApiRequest::Challenge
        | ApiRequest::LastAnswer(_)
        | ApiRequest::Reset
        | ApiRequest::ShopStatus
        | ApiRequest::BossStart => return Ok(None),
    };
    Ok(Some(body))
}

/// Parses a response body, honouring the service's `{"error": ...}` convention.
///
/// An `error` field wins over the status code; otherwise a non-OK status is a
/// transport failure.
pub fn decode_body<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ProtocolError> {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) if !(200..300).contains(&status) => return Err(ProtocolError::Status(status)),
        Err(err) => return Err(err.into()),
    };

    if let Some(error) = value.get("error").and_then(Value::as_str) {
        return Err(ProtocolError::Server(error.into()));
    }
    if !(200..300).contains(&status) {
        return Err(ProtocolError::Status(status));
    }
    Ok(serde_json::from_value(value)?)
}

/// Turns the HTTP outcome of `request` into the controller's input.
pub fn decode(request: &ApiRequest, status: u16, body: &str) -> Response {
    decode_inner(request, status, body)
        .unwrap_or_else(|err| Response::Failed(request.kind(), err.into()))
}

fn decode_inner(request: &ApiRequest, status: u16, body: &str) -> Result<Response, ProtocolError> {
    Ok(match request {
        ApiRequest::SetMode(_) => {
            decode_body::<Ack>(status, body)?;
            Response::ModeSet
        }
        ApiRequest::Challenge => {
            Response::Challenge(decode_body::<ChallengeBody>(status, body)?.into())
        }
        ApiRequest::Answer(_) => Response::Answer(decode_body::<AnswerBody>(status, body)?.into()),
        ApiRequest::LastAnswer(reveal) => Response::LastAnswer {
            reveal: *reveal,
            answer: decode_body::<LastAnswerBody>(status, body)?.answer(),
        },
        ApiRequest::Reset => {
            decode_body::<Ack>(status, body)?;
            Response::Reset
        }
        ApiRequest::ShopStatus | ApiRequest::Purchase(_) => {
            Response::Shop(decode_body::<ShopBody>(status, body)?.into())
        }
        ApiRequest::BossStart => {
            Response::BossStarted(decode_body::<BossStartBody>(status, body)?.into())
        }
        ApiRequest::BossAnswer(_) => {
            Response::BossAnswer(decode_body::<BossAnswerBody>(status, body)?.into())
        }
    })
}
