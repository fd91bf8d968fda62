use super::time::Tick;

/// Tags every completion request with the tick that produced it.
/// `seq` increases by one per dispatched request, across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId {
    pub seq: u64,
    pub tick: Tick,
}

/// What the transport hands back for one request. Sent exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionDelivery {
    pub request: RequestId,
    pub body: String,
    // false for transport failures and non-2xx statuses alike
    pub success: bool,
}

impl CompletionDelivery {
    pub fn succeeded(request: RequestId, body: impl Into<String>) -> Self {
        Self {
            request,
            body: body.into(),
            success: true,
        }
    }

    pub fn failed(request: RequestId, body: impl Into<String>) -> Self {
        Self {
            request,
            body: body.into(),
            success: false,
        }
    }
}
