//! CLI tool to run a saved card photo through the full scan pipeline.
//! Usage: cargo run --bin scan_card --features cli -- <path_to_photo.png>

use std::path::PathBuf;

use card_capture::StillSource;
use card_vision::{capture_and_warp, order_corners, recognize_text, OcrEngine, TesseractOcr};

fn main() {
    // Initialize tracing for debug output
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <photo.png> [output_dir]", args[0]);
        std::process::exit(1);
    }

    let input_path = PathBuf::from(&args[1]);
    let output_dir = if args.len() >= 3 {
        PathBuf::from(&args[2])
    } else {
        PathBuf::from("./scan_output")
    };
    let _ = std::fs::create_dir_all(&output_dir);

    println!("Loading photo: {}", input_path.display());
    let mut source = StillSource::open(&input_path).expect("Failed to open photo");

    // Detect + rectify
    println!("\n=== Boundary Detection ===");
    let outcome = capture_and_warp(&mut source).expect("Failed to capture frame");
    match &outcome.quad {
        Some(quad) => {
            let [tl, tr, br, bl] = order_corners(quad);
            println!("Top-left:     ({:.0}, {:.0})", tl.x, tl.y);
            println!("Top-right:    ({:.0}, {:.0})", tr.x, tr.y);
            println!("Bottom-right: ({:.0}, {:.0})", br.x, br.y);
            println!("Bottom-left:  ({:.0}, {:.0})", bl.x, bl.y);
        }
        None => println!("Card boundary: NOT FOUND (using raw frame)"),
    }
    println!("Rectified: {}", outcome.used_warp);
    println!(
        "Output image: {}x{}",
        outcome.image.width(),
        outcome.image.height()
    );
    let _ = outcome.image.save(output_dir.join("rectified.png"));

    // OCR + recognition
    println!("\n=== Text Recognition ===");
    let ocr = TesseractOcr::new();
    if !ocr.is_available() {
        println!("Tesseract not available! Install with: brew install tesseract");
        return;
    }

    let text = ocr.extract_text(&outcome.image);
    println!("Extracted {} characters:", text.len());
    for line in text.lines().take(12) {
        println!("  | {}", line);
    }
    let _ = std::fs::write(output_dir.join("ocr.txt"), &text);

    let recognition = recognize_text(&text);
    println!("\nGame:   {:?}", recognition.game);
    println!("Name:   {:?}", recognition.name);
    println!("HP:     {:?}", recognition.hp);
    println!("Number: {:?}", recognition.number);

    println!("\nDebug artifacts saved to: {}", output_dir.display());
}
