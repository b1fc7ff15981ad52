use async_trait::async_trait;

use crate::collectors::errors::MeasurementError;
use crate::models::ServerDescriptor;

/// Speed test collaborator driven by the sampler.
///
/// Server selection and the way bandwidth is measured belong to the
/// implementation. Throughput is returned in the client's raw units
/// (bytes per second for `HttpSpeedtestClient`); the sampler scales them.
#[async_trait]
pub trait MeasurementClient: Send {
    /// Fetches the servers the client may test against
    async fn list_candidate_servers(&mut self) -> Result<Vec<ServerDescriptor>, MeasurementError>;

    /// Picks the server every later measurement runs against
    async fn select_best_server(&mut self) -> Result<ServerDescriptor, MeasurementError>;

    async fn measure_download(&mut self) -> Result<f64, MeasurementError>;

    async fn measure_upload(&mut self) -> Result<f64, MeasurementError>;

    /// Latency to the selected server, `None` before a server is selected
    fn last_ping_ms(&self) -> Option<f64>;
}
