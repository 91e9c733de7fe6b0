use candle_core::Device;
use tracing::{debug, info, warn};

use super::error::EmbeddingError;

/// Picks the compute device: Metal, then CUDA (when compiled in), then CPU.
///
/// `force_cpu` skips GPU probing entirely.
pub fn select_device(force_cpu: bool) -> Result<Device, EmbeddingError> {
    if force_cpu {
        debug!("CPU device forced by configuration");
        return Ok(Device::Cpu);
    }

    let mut failures: Vec<String> = Vec::new();

    if cfg!(feature = "metal") {
        match Device::new_metal(0) {
            Ok(device) => {
                info!("Using Metal GPU acceleration");
                return Ok(device);
            }
            Err(e) => {
                warn!(error = %e, "Metal device unavailable");
                failures.push(format!("metal failed: {e}"));
            }
        }
    }

    if cfg!(feature = "cuda") {
        match Device::new_cuda(0) {
            Ok(device) => {
                info!("Using CUDA GPU acceleration");
                return Ok(device);
            }
            Err(e) => {
                warn!(error = %e, "CUDA device unavailable");
                failures.push(format!("cuda failed: {e}"));
            }
        }
    }

    if failures.is_empty() {
        debug!("No GPU backend compiled, using CPU device");
    } else {
        warn!(reason = %failures.join("; "), "Falling back to CPU device");
    }

    Ok(Device::Cpu)
}
