use chordwise_core::adapter;
use chordwise_core::{callback, EngineConfig, KeyPress};
use tracing_subscriber::EnvFilter;

const BINDINGS: &[&str] = &[
    "Tab a",
    "space c d",
    "leader t",
    "alt-a",
    "alt-b c d",
    "alt-ctrl-w",
];

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => chordwise_core::config::load_config(path)?,
        None => EngineConfig::default().with_timeout_ms(300),
    };
    let engine = adapter::shared(config);

    {
        let mut engine = engine.lock();
        engine.alias("leader", "l");
        for binding in BINDINGS {
            engine.register(
                binding,
                callback(|event, command| {
                    println!("fired {:?} on {:?}", command.key_string, event.key());
                }),
                Some(*binding),
                None,
            )?;
        }
    }

    let script = vec![
        KeyPress::new("Tab"),
        KeyPress::new("a"),
        KeyPress::new(" "),
        KeyPress::new("c"),
        KeyPress::new("d"),
        KeyPress::new("l"),
        KeyPress::new("t"),
        KeyPress::new("b").alt(),
        KeyPress::new("x"),
        KeyPress::new("w").alt().ctrl(),
    ];

    let (tx, rx) = crossbeam_channel::unbounded();
    let (fired_tx, fired_rx) = crossbeam_channel::unbounded();
    let handle = adapter::spawn_event_loop(engine, rx, Some(fired_tx));

    for event in script {
        tx.send(event)?;
    }
    drop(tx);

    let processed = handle
        .join()
        .map_err(|_| anyhow::anyhow!("event loop panicked"))?;
    let fired: Vec<String> = fired_rx.try_iter().flatten().collect();
    println!("processed {} events, fired {:?}", processed, fired);

    Ok(())
}
