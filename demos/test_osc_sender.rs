use std::path::Path;
use std::thread;
use std::time::Duration;

use osc_receiver::{send_message, Config, Message};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    simple_logger::init().ok();

    let config = Config::load_or_default(Path::new("config.json"));
    let target = config.osc.target_addr;
    println!("OSC Sender Test - sending to {}", target);

    // Test sending a few OSC messages
    let test_messages = vec![
        ("/test/1", 42),
        ("/synth/freq", 440),
        ("/app/param/1", 1),
        ("/app/param/2", 0),
    ];

    for (path, value) in test_messages {
        let mut msg = Message::new(path);
        msg.add_int_arg(value);
        send_message(&msg, &target)?;
        println!("Sent OSC: {} = {}", path, value);

        thread::sleep(Duration::from_millis(500));
    }

    println!("Test completed!");
    Ok(())
}
