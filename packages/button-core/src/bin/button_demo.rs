//! Button demo CLI - drives button controls from the command line.
//!
//! Every command prints a JSON `ApiResponse` so the output can be diffed or
//! consumed by other tools.

use button_core::{
    resolve_with_extra, ApiResponse, ButtonConfig, ButtonProps, Control, EventKind, FocusModality,
    Key, PointerButton, Size, StyleVector, Variant,
};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "button-demo")]
#[command(about = "Resolve button styles and simulate interaction sequences")]
#[command(version)]
struct Cli {
    /// Config file (defaults to BUTTON_CORE_CONFIG or the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the rule set for a style vector
    Resolve {
        #[arg(short, long, default_value = "primary")]
        variant: String,
        #[arg(short, long, default_value = "default")]
        size: String,
        #[arg(long)]
        hovered: bool,
        #[arg(long)]
        pressed: bool,
        #[arg(long)]
        focus_visible: bool,
        #[arg(long)]
        disabled: bool,
        #[arg(long)]
        loading: bool,
        /// Extra tokens appended after resolved rules
        #[arg(long)]
        class: Option<String>,
    },
    /// Feed an event script through a control and report each step
    Simulate {
        #[arg(short, long, default_value = "primary")]
        variant: String,
        #[arg(short, long, default_value = "default")]
        size: String,
        #[arg(long)]
        disabled: bool,
        #[arg(long)]
        loading: bool,
        /// Comma-separated events: enter, leave, down, up, cancel, focus-key,
        /// focus-pointer, focus-program, blur, enter-down, enter-up,
        /// space-down, space-up, tick
        #[arg(short, long)]
        events: String,
        /// Milliseconds advanced by each `tick`
        #[arg(long, default_value = "16")]
        step_ms: u64,
        /// Flip `loading` whenever the control activates
        #[arg(long)]
        toggle_loading: bool,
    },
    /// Render every variant and size, plus disabled and loading states
    Gallery {
        #[arg(long)]
        loading: bool,
    },
    /// Print the effective configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ButtonConfig::load_from_path(path),
        None => ButtonConfig::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            println!("{}", render(&ApiResponse::<()>::err(e.to_string()))?);
            return Ok(());
        }
    };

    let output = match cli.command {
        Commands::Resolve {
            variant,
            size,
            hovered,
            pressed,
            focus_visible,
            disabled,
            loading,
            class,
        } => handle_resolve(
            &variant,
            &size,
            [hovered, pressed, focus_visible, disabled, loading],
            class,
        ),
        Commands::Simulate {
            variant,
            size,
            disabled,
            loading,
            events,
            step_ms,
            toggle_loading,
        } => handle_simulate(
            config,
            &variant,
            &size,
            disabled,
            loading,
            &events,
            Duration::from_millis(step_ms),
            toggle_loading,
        ),
        Commands::Gallery { loading } => Ok(handle_gallery(config, loading)),
        Commands::Config => serde_json::to_value(config).map_err(anyhow::Error::from),
    };

    let text = match output {
        Ok(data) => render(&ApiResponse::ok(data))?,
        Err(e) => render(&ApiResponse::<()>::err(e.to_string()))?,
    };
    println!("{}", text);
    Ok(())
}

fn render<T: serde::Serialize>(response: &ApiResponse<T>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(response)
}

fn handle_resolve(
    variant: &str,
    size: &str,
    flags: [bool; 5],
    class: Option<String>,
) -> anyhow::Result<Value> {
    let [hovered, pressed, focus_visible, disabled, loading] = flags;
    let vector = StyleVector {
        variant: variant.parse()?,
        size: size.parse()?,
        hovered,
        pressed,
        focus_visible,
        disabled,
        loading,
    };

    let rules = resolve_with_extra(&vector, class.iter());
    Ok(json!({
        "vector": vector,
        "rules": rules,
        "class": rules.to_class_string(),
    }))
}

fn parse_event(name: &str) -> Option<Option<EventKind>> {
    let event = match name.trim() {
        "enter" => EventKind::PointerEnter,
        "leave" => EventKind::PointerLeave,
        "down" => EventKind::PointerDown(PointerButton::Primary),
        "up" => EventKind::PointerUp(PointerButton::Primary),
        "cancel" => EventKind::PointerCancel,
        "focus-key" => EventKind::Focus(FocusModality::Keyboard),
        "focus-pointer" => EventKind::Focus(FocusModality::Pointer),
        "focus-program" => EventKind::Focus(FocusModality::Programmatic),
        "blur" => EventKind::Blur,
        "enter-down" => EventKind::KeyDown(Key::Enter),
        "enter-up" => EventKind::KeyUp(Key::Enter),
        "space-down" => EventKind::KeyDown(Key::Space),
        "space-up" => EventKind::KeyUp(Key::Space),
        "tick" => return Some(None),
        _ => return None,
    };
    Some(Some(event))
}

#[allow(clippy::too_many_arguments)]
fn handle_simulate(
    config: ButtonConfig,
    variant: &str,
    size: &str,
    disabled: bool,
    loading: bool,
    events: &str,
    step: Duration,
    toggle_loading: bool,
) -> anyhow::Result<Value> {
    let variant: Variant = variant.parse()?;
    let size: Size = size.parse()?;

    let activations = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&activations);
    let props = ButtonProps::new("Button")
        .variant(variant)
        .size(size)
        .disabled(disabled)
        .loading(loading)
        .on_activate(move |_| counter.set(counter.get() + 1));
    let mut control = Control::with_config(props, config);

    let mut timeline = Vec::new();
    for name in events.split(',').filter(|s| !s.trim().is_empty()) {
        let Some(event) = parse_event(name) else {
            anyhow::bail!("Unknown event: {}", name.trim());
        };

        let before = activations.get();
        match event {
            Some(kind) => control.dispatch(kind)?,
            None => {
                control.tick(step);
            }
        }
        let activated = activations.get() > before;

        if activated && toggle_loading {
            let next = !control.props().loading;
            control.set_loading(next);
        }

        let rendered = control.render();
        timeline.push(json!({
            "event": name.trim(),
            "state": rendered.state,
            "activated": activated,
            "loading": control.props().loading,
            "overlay_visible": rendered.overlay_visible,
            "scale": rendered.scale,
            "rules": rendered.rules,
        }));
    }

    control.unmount();

    Ok(json!({
        "variant": variant,
        "size": size,
        "activations": activations.get(),
        "timeline": timeline,
    }))
}

fn handle_gallery(config: ButtonConfig, loading: bool) -> Value {
    let mut cells = Vec::new();

    for variant in Variant::ALL {
        let label = match variant {
            Variant::Primary => "Primary",
            Variant::Secondary => "Secondary",
            Variant::Destructive => "Destructive",
            Variant::Ghost => "Ghost",
            Variant::Link => "Link",
        };
        let row = [
            ButtonProps::new(label).size(Size::Small),
            ButtonProps::new(label).size(Size::Default),
            ButtonProps::new(label).size(Size::Default).disabled(true),
            ButtonProps::new(label).size(Size::Default).loading(loading),
            ButtonProps::new(label).size(Size::Large),
        ];

        for props in row {
            let control = Control::with_config(
                props.variant(variant).class_name("justify-self-center"),
                config,
            );
            let rendered = control.render();
            cells.push(json!({
                "variant": rendered.variant,
                "size": rendered.size,
                "label": rendered.label,
                "disabled": control.props().disabled,
                "loading": control.props().loading,
                "class": rendered.rules.to_class_string(),
                "label_class": rendered.label_rules.to_class_string(),
                "overlay": rendered.overlay,
                "attributes": rendered.handlers.attributes(),
            }));
        }
    }

    json!({ "columns": 5, "buttons": cells })
}
