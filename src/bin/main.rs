use ipquery::config::load_config;
use ipquery::service::IpQueryService;

/// Stands in for the chat host: `ipquery [IP]` behaves like the message `ip [IP]`.
fn main() -> anyhow::Result<()> {
    let config = load_config()?;

    simple_logger::init_with_level(config.log_level)?;

    let service = IpQueryService::from_config(config);
    let message = std::iter::once(service.command().to_owned())
        .chain(std::env::args().skip(1))
        .collect::<Vec<_>>()
        .join(" ");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let reply = runtime.block_on(service.respond(&message));
    println!("{reply}");
    Ok(())
}
