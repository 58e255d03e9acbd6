//! Offline denoising CLI: decode one file, run the model, write the
//! cleaned WAV next to it.

fn main() {
    if let Err(e) = run() {
        eprintln!("clean failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    use clarion_core::inference::stub::PassthroughModel;
    use clarion_core::{DenoiseEngine, EngineConfig, ModelHandle};
    use std::path::PathBuf;

    #[derive(Debug)]
    struct Args {
        input: PathBuf,
        output: Option<PathBuf>,
        model: Option<PathBuf>,
    }

    fn parse_args() -> Result<Args, String> {
        let mut input: Option<PathBuf> = None;
        let mut output: Option<PathBuf> = None;
        let mut model: Option<PathBuf> = None;

        let mut it = std::env::args().skip(1);
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--input" => {
                    let Some(v) = it.next() else {
                        return Err("missing value for --input".into());
                    };
                    input = Some(PathBuf::from(v));
                }
                "--output" => {
                    let Some(v) = it.next() else {
                        return Err("missing value for --output".into());
                    };
                    output = Some(PathBuf::from(v));
                }
                "--model" => {
                    let Some(v) = it.next() else {
                        return Err("missing value for --model".into());
                    };
                    model = Some(PathBuf::from(v));
                }
                "--help" | "-h" => {
                    println!(
                        "Usage: cargo run -p clarion-core --bin clean -- \\
  --input <file> [--output <file.wav>] [--model <weights.onnx>]"
                    );
                    std::process::exit(0);
                }
                other => {
                    return Err(format!("unknown argument: {other}"));
                }
            }
        }

        let Some(input) = input else {
            return Err("missing required --input".into());
        };
        Ok(Args {
            input,
            output,
            model,
        })
    }

    let args = parse_args()?;
    let output = args.output.unwrap_or_else(|| {
        let stem = args
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("upload");
        args.input.with_file_name(format!("{stem} - clean.wav"))
    });

    #[cfg(feature = "onnx")]
    let model = match args.model {
        Some(path) => {
            use clarion_core::{OnnxDenoiser, OnnxDenoiserConfig};
            ModelHandle::new(OnnxDenoiser::new(OnnxDenoiserConfig::new(path)))
        }
        None => ModelHandle::new(PassthroughModel::new()),
    };

    #[cfg(not(feature = "onnx"))]
    let model = {
        if args.model.is_some() {
            return Err("--model requires building with the 'onnx' feature".into());
        }
        ModelHandle::new(PassthroughModel::new())
    };

    let engine = DenoiseEngine::new(EngineConfig::default(), model);
    engine.warm_up().map_err(|e| e.to_string())?;
    engine
        .clean_file(&args.input, &output)
        .map_err(|e| e.to_string())?;

    println!("wrote {}", output.display());
    Ok(())
}
