use agentflow::render::raster::{RasterError, RasterOptions, svg_to_png};
use agentflow::render::{BuiltinLayouts, LayoutOptions, SvgRenderOptions, layout_graph_with};
use agentflow::{FlowConfig, FlowGraph, LayoutMode, NodeType, parse_graph_json};
use agentflow_render::text::wrap_label;
use serde::Serialize;
use serde_json::json;
use std::io::Read;
use std::str::FromStr;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Core(agentflow::Error),
    Render(agentflow_render::Error),
    Raster(RasterError),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Core(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Raster(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<agentflow::Error> for CliError {
    fn from(value: agentflow::Error) -> Self {
        Self::Core(value)
    }
}

impl From<agentflow_render::Error> for CliError {
    fn from(value: agentflow_render::Error) -> Self {
        Self::Render(value)
    }
}

impl From<RasterError> for CliError {
    fn from(value: RasterError) -> Self {
        Self::Raster(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Parse,
    Wrap,
    Layout,
    Render,
}

#[derive(Debug, Clone, Copy, Default)]
enum RenderFormat {
    #[default]
    Svg,
    Png,
}

impl FromStr for RenderFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    node_type: Option<String>,
    config: Option<String>,
    mode: Option<LayoutMode>,
    viewport_width: Option<f64>,
    viewport_height: Option<f64>,
    top_margin: Option<f64>,
    render_format: RenderFormat,
    render_scale: f32,
    background: Option<String>,
    diagram_id: Option<String>,
    fit_view: bool,
    out: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Diagnostics<'a> {
    dangling_edges: Vec<&'a str>,
    duplicate_node_ids: Vec<&'a str>,
}

#[derive(Serialize)]
struct ParseOut<'a> {
    graph: &'a FlowGraph,
    diagnostics: Diagnostics<'a>,
}

fn usage() -> &'static str {
    "agentflow-cli\n\
\n\
USAGE:\n\
  agentflow-cli [parse] [--pretty] [<path>|-]\n\
  agentflow-cli wrap --type <node-type> [<text>|-]\n\
  agentflow-cli layout [--pretty] [--config <path>] [--mode <mode>] [--viewport-width <w>] [--viewport-height <h>] [--top-margin <y>] [<path>|-]\n\
  agentflow-cli render [--format svg|png] [--scale <n>] [--background <css-color>] [--id <diagram-id>] [--fit-view] [--out <path>] [--config <path>] [--mode <mode>] [--viewport-width <w>] [--viewport-height <h>] [--top-margin <y>] [<path>|-]\n\
\n\
MODES:\n\
  zigzag, smart (snake grid); grid, circle, breadthfirst (built-in); dagre, cose-bilkent (external engine required)\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - parse prints the trace graph plus diagnostics (dangling edges, duplicate ids) as JSON.\n\
  - --config accepts YAML or JSON; command-line flags override it.\n\
  - render prints SVG to stdout by default; use --out to write a file.\n\
  - PNG output defaults to writing next to the input file (or ./out.png for stdin).\n\
  - Set AGENTFLOW_LOG (e.g. AGENTFLOW_LOG=debug) to see layout diagnostics on stderr.\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn next_f64<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<f64, CliError> {
    let v = next_value(it)?
        .parse::<f64>()
        .map_err(|_| CliError::Usage(usage()))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CliError::Usage(usage()))
    }
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        render_scale: 1.0,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "parse" => args.command = Command::Parse,
            "wrap" => args.command = Command::Wrap,
            "layout" => args.command = Command::Layout,
            "render" => args.command = Command::Render,
            "--pretty" => args.pretty = true,
            "--fit-view" => args.fit_view = true,
            "--type" => args.node_type = Some(next_value(&mut it)?.clone()),
            "--config" => args.config = Some(next_value(&mut it)?.clone()),
            "--mode" => {
                args.mode = Some(
                    next_value(&mut it)?
                        .parse::<LayoutMode>()
                        .map_err(|_| CliError::Usage(usage()))?,
                );
            }
            "--viewport-width" => args.viewport_width = Some(next_f64(&mut it)?),
            "--viewport-height" => args.viewport_height = Some(next_f64(&mut it)?),
            "--top-margin" => args.top_margin = Some(next_f64(&mut it)?),
            "--format" => {
                args.render_format = next_value(&mut it)?
                    .parse::<RenderFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--scale" => {
                args.render_scale = next_value(&mut it)?
                    .parse::<f32>()
                    .map_err(|_| CliError::Usage(usage()))?;
                if !(args.render_scale.is_finite() && args.render_scale > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--background" => {
                let bg = next_value(&mut it)?;
                if !bg.trim().is_empty() {
                    args.background = Some(bg.trim().to_string());
                }
            }
            "--id" => args.diagram_id = Some(next_value(&mut it)?.clone()),
            "--out" => args.out = Some(next_value(&mut it)?.clone()),
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    if matches!(args.command, Command::Wrap) && args.node_type.is_none() {
        return Err(CliError::Usage(usage()));
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None | Some("-") => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn default_raster_out_path(input: Option<&str>, ext: &str) -> std::path::PathBuf {
    match input {
        Some(path) if path != "-" => std::path::PathBuf::from(path).with_extension(ext),
        _ => std::path::PathBuf::from(format!("out.{ext}")),
    }
}

/// Loads `--config` (YAML unless the file ends in `.json`) and applies flag overrides.
fn load_config(args: &Args) -> Result<FlowConfig, CliError> {
    let mut config = match args.config.as_deref() {
        None => FlowConfig::defaults(),
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            if path.ends_with(".json") {
                FlowConfig::from_json_str(&text)?
            } else {
                FlowConfig::from_yaml_str(&text)?
            }
        }
    };

    if let Some(mode) = args.mode {
        config.set_value("layout.mode", json!(mode.as_str()));
    }
    if let Some(w) = args.viewport_width {
        config.set_value("viewport.width", json!(w));
    }
    if let Some(h) = args.viewport_height {
        config.set_value("viewport.height", json!(h));
    }
    if let Some(y) = args.top_margin {
        config.set_value("layout.topMargin", json!(y));
    }
    Ok(config)
}

fn layout_options(args: &Args) -> Result<LayoutOptions, CliError> {
    let config = load_config(args)?;
    let options = LayoutOptions::from_config(&config)?;
    tracing::debug!(
        mode = options.mode.as_str(),
        viewport_width = options.viewport.width,
        viewport_height = options.viewport.height,
        "resolved layout options"
    );
    Ok(options)
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Command::Wrap => {
            let text = match args.input.as_deref() {
                Some(text) if text != "-" => text.to_string(),
                _ => read_input(None)?,
            };
            let node_type = NodeType::parse(args.node_type.as_deref().unwrap_or_default());
            let text = text.strip_suffix('\n').unwrap_or(&text);
            let wrapped = wrap_label(text, &node_type);
            if !wrapped.is_empty() {
                println!("{wrapped}");
            }
            Ok(())
        }
        Command::Parse => {
            let text = read_input(args.input.as_deref())?;
            let graph = parse_graph_json(&text)?;
            let out = ParseOut {
                graph: &graph,
                diagnostics: Diagnostics {
                    dangling_edges: graph
                        .dangling_edges()
                        .into_iter()
                        .map(|e| e.id.as_str())
                        .collect(),
                    duplicate_node_ids: graph.duplicate_node_ids(),
                },
            };
            write_json(&out, args.pretty)
        }
        Command::Layout => {
            let text = read_input(args.input.as_deref())?;
            let graph = parse_graph_json(&text)?;
            let options = layout_options(&args)?;
            let layouted =
                layout_graph_with(&graph, &options, Some(&BuiltinLayouts::default()))?;
            write_json(&layouted, args.pretty)
        }
        Command::Render => {
            let text = read_input(args.input.as_deref())?;
            let graph = parse_graph_json(&text)?;
            let options = layout_options(&args)?;
            let layouted =
                layout_graph_with(&graph, &options, Some(&BuiltinLayouts::default()))?;

            let svg_options = SvgRenderOptions {
                diagram_id: args.diagram_id.clone(),
                background: args.background.clone(),
                apply_view_transform: args.fit_view,
                ..Default::default()
            };
            let svg = agentflow_render::svg::render_layouted_svg(&layouted, &svg_options);

            match args.render_format {
                RenderFormat::Svg => write_text(&svg, args.out.as_deref())?,
                RenderFormat::Png => {
                    let raster = RasterOptions {
                        scale: args.render_scale,
                        background: Some(
                            args.background.clone().unwrap_or_else(|| "white".to_string()),
                        ),
                    };
                    let bytes = svg_to_png(&svg, &raster)?;
                    let out = args.out.clone().unwrap_or_else(|| {
                        default_raster_out_path(args.input.as_deref(), "png")
                            .to_string_lossy()
                            .to_string()
                    });
                    if out == "-" {
                        use std::io::Write;
                        std::io::stdout().lock().write_all(&bytes)?;
                    } else {
                        std::fs::write(out, bytes)?;
                    }
                }
            }
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("AGENTFLOW_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    init_tracing();

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
