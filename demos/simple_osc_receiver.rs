use std::io::Write;
use std::path::Path;
use std::thread;
use std::time::Duration;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use osc_receiver::{Config, Listener};

// Print the listening banner in green (works on Windows CMD via termcolor)
fn print_listening_banner(port: u16) {
    let mut stdout = StandardStream::stdout(ColorChoice::Always);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_intense(true));
    let _ = writeln!(&mut stdout, "OSC receiver active | listening on port {}", port);
    let _ = stdout.reset();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    simple_logger::init().ok();

    let config = Config::load_or_default(Path::new("config.json"));

    let mut listener = Listener::new();
    listener.setup(config.osc.listening_port)?;
    let port = listener.local_port().unwrap_or(config.osc.listening_port);
    print_listening_banner(port);
    println!("Polling for OSC messages (Ctrl-C to quit)...");

    loop {
        while let Some(msg) = listener.get_next_message() {
            println!(
                "Received from {}:{} -> {}",
                msg.remote_host, msg.remote_port, msg
            );
            if config.osc.debug {
                for (i, arg) in msg.args().iter().enumerate() {
                    println!("    arg {}: {:?}", i, arg);
                }
            }
        }
        thread::sleep(Duration::from_millis(10));
    }
}
