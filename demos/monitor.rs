use std::{env, io::BufRead, str::FromStr, thread};

use inquire::Select;
use rotel_rs232::{Amplifier, Balance, Command, Config, Event, Flag, Power, State};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Get serial port from command line arg or interactive selection
    let port_name = env::args().nth(1).unwrap_or_else(|| {
        let ports = serialport::available_ports().expect("Failed to enumerate serial ports");

        if ports.is_empty() {
            eprintln!("No serial ports found!");
            std::process::exit(1);
        }

        let port_names: Vec<String> = ports.iter().map(|p| p.port_name.clone()).collect();

        Select::new("Select a serial port:", port_names)
            .prompt()
            .expect("Failed to select port")
    });

    println!("Using port: {}", port_name);

    let amp = Amplifier::open(&Config::new(port_name)).expect("Failed to open amplifier");

    let subscription = amp.subscribe();
    thread::spawn(move || {
        for event in subscription.events().iter() {
            match event {
                Event::Changed { flags, state } => {
                    println!("{flags:?} -> {state}");
                    if let Some(speaker) = state.speaker.filter(|_| flags.contains(Flag::SPEAKER)) {
                        println!("speaker A: {}, speaker B: {}", speaker.a(), speaker.b());
                    }
                }
                Event::Failed(err) => println!("error: {err}"),
            }
        }
    });

    println!("Type a command token (e.g. mute, vol_up, power_toggle), `on`, `off`, `vol N`, `balance N` (negative is left) or `quit`.");
    for line in std::io::stdin().lock().lines() {
        let line = line.expect("Failed to read stdin");
        let words: Vec<&str> = line.split_whitespace().collect();
        let result = match words.as_slice() {
            [] => continue,
            ["quit"] => break,
            ["on"] => amp.set(&State {
                power: Some(Power::On),
                ..State::default()
            }),
            ["off"] => amp.set(&State {
                power: Some(Power::Standby),
                ..State::default()
            }),
            ["vol", volume] => match volume.parse() {
                Ok(volume) => amp.set(&State {
                    volume: Some(volume),
                    ..State::default()
                }),
                Err(_) => {
                    println!("volume must be a number");
                    continue;
                }
            },
            ["balance", offset] => match offset.parse() {
                Ok(offset) => amp.set(&State {
                    balance: Some(Balance::from_offset(offset)),
                    ..State::default()
                }),
                Err(_) => {
                    println!("balance must be a number between -15 and 15");
                    continue;
                }
            },
            [token] => match Command::from_str(token) {
                Ok(command) => amp.send(command),
                Err(_) => {
                    println!("unknown command {token:?}");
                    continue;
                }
            },
            _ => {
                println!("unknown input");
                continue;
            }
        };
        if let Err(err) = result {
            println!("rejected: {err}");
        }
    }

    println!("Model {}: {}", amp.model(), amp.get());
    amp.close().expect("Failed to close amplifier");
}
