use service_mesh::config::{parse_discovery_args, parse_node_args};
use service_mesh::discovery::server::DiscoveryServer;
use service_mesh::node::server::NodeServer;
use service_mesh::{shutdown, telemetry};

fn usage(program: &str) {
    eprintln!("Usage: {} discovery [--bind <addr:port>]", program);
    eprintln!(
        "       {} node --name <name> [--host <host>] [--advertise-host <host>] [--port <port>] [--discovery <url>] [--termination-probability <p>] [--max-hops <n>] [--seed <n>]",
        program
    );
    eprintln!("Example: {} discovery --bind 127.0.0.1:8090", program);
    eprintln!(
        "Example: {} node --name a --discovery http://127.0.0.1:8090",
        program
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("service-mesh");

    match args.get(1).map(String::as_str) {
        Some("discovery") => {
            let config = parse_discovery_args(&args[2..])?;
            let server = DiscoveryServer::bind(config).await?;
            server.run(shutdown::signal()).await?;
        }
        Some("node") => {
            let config = parse_node_args(&args[2..], |key| std::env::var(key).ok())?;
            let server = NodeServer::bind(config).await?;
            tracing::info!(
                "Node {} will be reachable at {}",
                server.identity().name,
                server.identity().addr
            );
            // Registration failure is fatal: the error ends the process non-zero.
            server.run(shutdown::signal()).await?;
        }
        _ => {
            usage(program);
            std::process::exit(1);
        }
    }

    Ok(())
}
