//! Loopback transfer — sends a planar 16-bit stack between two threads and
//! prints what arrived.
//!
//! Run with:
//!   cargo run --example loopback

use imgwire::channel::MemoryChannel;
use imgwire::transfer::{
    recv_image, send_image, ArrivalWatchdog, Image, PixelData, TypedBuffer,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .init();

    let (mut tx, mut rx) = MemoryChannel::pair();

    let sender = std::thread::spawn(move || {
        // A 256x256 stack of 4 planes with a recognizable ramp per plane.
        let planes: Vec<TypedBuffer> = (0..4)
            .map(|p| {
                let pixels: Vec<u16> = (0..256 * 256)
                    .map(|i| (p as u32 * 1000 + i % 1000) as u16)
                    .collect();
                TypedBuffer::from_elements(&pixels)
            })
            .collect();
        let image = Image::from_planes(vec![256, 256, 4], planes).expect("valid geometry");
        send_image(&image, &mut tx).expect("send failed");
    });

    let watchdog = ArrivalWatchdog::default();
    let image = recv_image(&mut rx, &watchdog)?;
    sender.join().expect("sender thread panicked");

    println!(
        "received {} image, dims {:?}, {} elements",
        image.element_type(),
        image.dims(),
        image.element_count()
    );
    if let PixelData::Planar(planes) = image.pixel_data() {
        for (index, plane) in planes.iter().enumerate() {
            let pixels = plane.to_elements::<u16>()?;
            println!(
                "  plane {index}: first={} last={}",
                pixels.first().copied().unwrap_or_default(),
                pixels.last().copied().unwrap_or_default()
            );
        }
    }
    Ok(())
}
