use candle_core::Device;
use tracing::info;

/// Metal when built with the `metal` feature and a GPU is present, CPU
/// otherwise. `APP_EMBED_DEVICE=cpu` pins the CPU.
pub fn select_device() -> Device {
    let forced_cpu = std::env::var("APP_EMBED_DEVICE").map(|v| v.eq_ignore_ascii_case("cpu")).unwrap_or(false);
    if forced_cpu {
        info!("embedding device: CPU (APP_EMBED_DEVICE)");
        return Device::Cpu;
    }
    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(dev) => {
                info!("embedding device: Metal");
                return dev;
            }
            Err(e) => tracing::warn!(error = %e, "Metal unavailable; falling back to CPU"),
        }
    }
    info!("embedding device: CPU");
    Device::Cpu
}
