mod bot;
mod notify;

pub use bot::Bot;
pub use notify::Discord;

use ed25519_dalek::{Signature, SignatureError, Verifier, VerifyingKey};
use http_body_util::{BodyExt, Full};
use hyper::{
    body::{Body, Bytes},
    header::{HeaderValue, CONTENT_TYPE},
    HeaderMap, Method, Request, Response, StatusCode,
};

/// Discord's interaction endpoint: verifies the request signature before handing the interaction to
/// the [`Bot`].
pub struct App {
    bot: Bot,
    public: VerifyingKey,
}

impl App {
    pub fn new(bot: Bot, public: &[u8; 32]) -> Result<Self, SignatureError> {
        let public = VerifyingKey::from_bytes(public)?;
        Ok(Self { bot, public })
    }

    pub async fn respond<B: Body>(&self, req: Request<B>) -> Response<Full<Bytes>> {
        match self.try_respond(req).await {
            Ok(res) => res,
            Err(code) => {
                let mut res = Response::new(Full::default());
                *res.status_mut() = code;
                res
            }
        }
    }

    pub async fn try_respond<B: Body>(&self, req: Request<B>) -> Result<Response<Full<Bytes>>, StatusCode> {
        // For now, we only allow requests from the root endpoint.
        if req.method() != Method::POST || req.uri().path() != "/" {
            return Err(StatusCode::NOT_FOUND);
        }

        let (parts, body) = req.into_parts();
        let payload = body.collect().await.map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?.to_bytes();
        verify(&self.public, &parts.headers, &payload)?;

        // Parse incoming interaction
        let interaction = serde_json::from_slice(&payload).map_err(|_| StatusCode::BAD_REQUEST)?;
        drop(payload);

        // Construct new body
        let reply = self.bot.on_message(interaction).await;
        let bytes = serde_json::to_vec(&reply).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        let mut res = Response::new(Full::new(Bytes::from(bytes)));
        assert!(res.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json")).is_none());
        Ok(res)
    }
}

/// Checks the Ed25519 signature of `timestamp || payload` against the application's public key.
fn verify(public: &VerifyingKey, headers: &HeaderMap, payload: &[u8]) -> Result<(), StatusCode> {
    let maybe_sig = headers.get("X-Signature-Ed25519");
    let maybe_time = headers.get("X-Signature-Timestamp");
    let (sig, timestamp) = maybe_sig.zip(maybe_time).ok_or(StatusCode::UNAUTHORIZED)?;

    let mut signature = [0; Signature::BYTE_SIZE];
    hex::decode_to_slice(sig, &mut signature).map_err(|_| StatusCode::BAD_REQUEST)?;
    let signature = Signature::from_bytes(&signature);

    // Append body after the timestamp
    let mut message = timestamp.as_bytes().to_vec();
    message.extend_from_slice(payload);
    public.verify(&message, &signature).map_err(|_| StatusCode::UNAUTHORIZED)
}
