//! Check that the render tools are installed.

use dashmix_render_engine::ffmpeg::command_exists;

pub async fn run() -> anyhow::Result<()> {
    println!("DashMix System Check");
    println!("{}", "=".repeat(50));

    let mut all_ok = true;
    for (binary, purpose) in [("ffmpeg", "rendering exports"), ("ffprobe", "reading clip durations")] {
        if command_exists(binary).await {
            println!("[OK] {binary} found ({purpose})");
        } else {
            all_ok = false;
            println!("[MISSING] {binary} not found in PATH ({purpose})");
        }
    }

    println!();
    if all_ok {
        println!("All render tools are available. DashMix is ready.");
    } else {
        println!("Install ffmpeg (which ships ffprobe) to enable exports.");
    }

    Ok(())
}
