//! In-memory bulb used by unit tests.

use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use crate::errors::Error;
use crate::transport::Transport;

type Result<T> = std::result::Result<T, Error>;
type Responder = Box<dyn Fn(&Value) -> Result<Value> + Send + Sync>;

#[derive(Default)]
struct LogInner {
    requests: Vec<Value>,
    failure: Option<Error>,
}

/// Shared view of the requests a [`MockTransport`] received.
#[derive(Clone, Default)]
pub(crate) struct RequestLog(Arc<Mutex<LogInner>>);

impl RequestLog {
    pub fn len(&self) -> usize {
        self.0.lock().unwrap().requests.len()
    }

    pub fn all(&self) -> Vec<Value> {
        self.0.lock().unwrap().requests.clone()
    }

    pub fn last(&self) -> Option<Value> {
        self.0.lock().unwrap().requests.last().cloned()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().requests.clear();
    }

    /// Make the next request fail with `error` after being recorded.
    pub fn fail_with(&self, error: Error) {
        self.0.lock().unwrap().failure = Some(error);
    }

    /// Lighting command arguments of every `transition_light_state` request.
    pub fn transitions(&self) -> Vec<Value> {
        self.all()
            .into_iter()
            .filter_map(|request| {
                request
                    .get("smartlife.iot.smartbulb.lightingservice")?
                    .get("transition_light_state")
                    .cloned()
            })
            .collect()
    }
}

pub(crate) struct MockTransport {
    log: RequestLog,
    responder: Responder,
}

impl MockTransport {
    /// A bulb that is on, white at 2700K and half brightness.
    pub fn new() -> Self {
        Self::with_light_state(default_light_state())
    }

    pub fn with_light_state(light_state: Value) -> Self {
        Self::responding(move |command| Ok(reply(command, &light_state)))
    }

    pub fn responding<F>(responder: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        MockTransport {
            log: RequestLog::default(),
            responder: Box::new(responder),
        }
    }

    pub fn requests(&self) -> RequestLog {
        self.log.clone()
    }
}

impl Transport for MockTransport {
    async fn request(&self, command: &Value) -> Result<Value> {
        let failure = {
            let mut inner = self.log.0.lock().unwrap();
            inner.requests.push(command.clone());
            inner.failure.take()
        };
        match failure {
            Some(error) => Err(error),
            None => (self.responder)(command),
        }
    }
}

pub(crate) fn default_light_state() -> Value {
    json!({
        "on_off": 1, "mode": "normal", "hue": 0, "saturation": 0,
        "color_temp": 2700, "brightness": 50,
    })
}

/// Successful answer to `command` from a bulb showing `light_state`.
pub(crate) fn reply(command: &Value, light_state: &Value) -> Value {
    let (service, body) = command.as_object().unwrap().iter().next().unwrap();
    let (method, _) = body.as_object().unwrap().iter().next().unwrap();

    let mut result = match method.as_str() {
        "get_sysinfo" => json!({
            "sw_ver": "1.8.6 Build 180809 Rel.091659",
            "model": "LB130(EU)",
            "alias": "Bedside",
            "deviceId": "80120B3D03E0",
            "light_state": light_state,
        }),
        "get_light_details" => json!({
            "lamp_beam_angle": 150, "min_voltage": 220, "max_voltage": 240,
            "wattage": 10, "incandescent_equivalent": 60, "max_lumens": 800,
            "color_rendering_index": 80,
        }),
        "get_time" => json!({
            "year": 2024, "month": 5, "mday": 17, "hour": 6, "min": 30, "sec": 0,
        }),
        "get_timezone" => json!({"index": 6}),
        _ => json!({}),
    };
    result["err_code"] = json!(0);
    json!({ service: { method: result } })
}
