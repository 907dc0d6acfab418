//! Scripted transport used by engine tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use da_api::{AdminRequest, AdminResponse, AdminTransport, TransportError, TransportErrorKind};
use reqwest::StatusCode;

/// Replies are queued per route (the first path segment, e.g. `source`,
/// `preview`, `live`). Every request is recorded.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Result<AdminResponse, TransportError>>>>,
    requests: Mutex<Vec<AdminRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(self, route: &str, status: u16, content_type: &str, body: &str) -> Self {
        self.push(
            route,
            Ok(AdminResponse {
                status: StatusCode::from_u16(status).expect("status"),
                content_type: Some(content_type.to_string()),
                body: body.as_bytes().to_vec(),
            }),
        )
    }

    pub(crate) fn fail(self, route: &str, kind: TransportErrorKind, message: &str) -> Self {
        self.push(route, Err(TransportError::new(kind, message)))
    }

    fn push(self, route: &str, reply: Result<AdminResponse, TransportError>) -> Self {
        self.replies
            .lock()
            .expect("replies lock")
            .entry(route.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub(crate) fn requests(&self) -> Vec<AdminRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub(crate) fn calls_to(&self, route: &str) -> usize {
        self.requests().iter().filter(|request| route_of(request) == route).count()
    }
}

fn route_of(request: &AdminRequest) -> String {
    request
        .url
        .path_segments()
        .and_then(|mut segments| segments.next())
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl AdminTransport for ScriptedTransport {
    async fn execute(&self, request: AdminRequest) -> Result<AdminResponse, TransportError> {
        let route = route_of(&request);
        self.requests.lock().expect("requests lock").push(request);
        self.replies
            .lock()
            .expect("replies lock")
            .get_mut(&route)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(TransportError::new(TransportErrorKind::Other, format!("no scripted reply for '{route}'"))))
    }
}
