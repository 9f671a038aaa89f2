mod app;
mod config;
mod data;
mod error;
mod export;
mod insights;
mod plot3d;
mod processing;
mod render;
mod state;
mod ui;

use app::SheetSightApp;
use config::Config;
use eframe::egui;
use eframe::egui_wgpu;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("SheetSight")
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([800.0, 600.0])
            .with_drag_and_drop(true),
        wgpu_options: egui_wgpu::WgpuConfiguration {
            present_mode: eframe::wgpu::PresentMode::AutoVsync,
            wgpu_setup: egui_wgpu::WgpuSetup::CreateNew(egui_wgpu::WgpuSetupCreateNew {
                instance_descriptor: eframe::wgpu::InstanceDescriptor {
                    // DX12 first on Windows; Vulkan and GL as fallbacks.
                    backends: eframe::wgpu::Backends::DX12
                        | eframe::wgpu::Backends::VULKAN
                        | eframe::wgpu::Backends::GL,
                    ..Default::default()
                },
                power_preference: eframe::wgpu::PowerPreference::HighPerformance,
                ..Default::default()
            }),
            ..Default::default()
        },
        ..Default::default()
    };

    eframe::run_native(
        "SheetSight",
        options,
        Box::new(|cc| Ok(Box::new(SheetSightApp::new(cc, config)))),
    )
}
