// A TCP echo server written against the socket API, running on the host driver.
//
// Try it with `nc localhost 7777`.
use clap::Parser;
use ninasock::{HostDriver, Interface, Protocol, State, Type};

#[derive(Parser)]
#[command(about = "Echo back everything received on a TCP port")]
struct Args {
    /// The port to listen on.
    #[arg(short, long, default_value_t = 7777)]
    port: u16,
    /// The most connections served at the same time.
    #[arg(short, long, default_value_t = 4)]
    backlog: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let iface = Interface::new(HostDriver::new());
    let listener = iface.socket(Type::Stream, Protocol::Tcp);
    if !listener.is_valid() {
        return Err(format!("cannot create socket: error {}", iface.last_error()).into());
    }
    listener.set_nonblocking(true)?;
    listener.bind(args.port)?;
    listener.listen(args.backlog)?;
    println!("listening on port {}", args.port);

    let mut clients = Vec::new();
    let mut buf = [0; 1024];
    loop {
        match listener.accept() {
            Ok((conn, remote)) => {
                println!("{remote} connected");
                conn.set_nonblocking(true)?;
                clients.push((conn, remote));
            }
            Err(e) if e.is_would_block() => (),
            Err(e) => return Err(e.into()),
        }

        // Serve every client that has something for us, dropping (and so closing) the ones that
        // are done.
        clients.retain(|(conn, remote)| {
            let state = match conn.poll() {
                Ok(state) => state,
                Err(_) => return false,
            };
            if !state.contains(State::READABLE) {
                return true;
            }

            match conn.recv(&mut buf) {
                Ok(0) => {
                    println!("{remote} disconnected");
                    false
                }
                Ok(n) => conn.send(&buf[..n]).is_ok(),
                Err(e) if e.is_would_block() => true,
                Err(e) => {
                    eprintln!("{remote}: {e}");
                    false
                }
            }
        });

        std::thread::sleep(std::time::Duration::from_millis(10));
    }
}
