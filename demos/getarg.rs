use argmap::Store;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Command line first, then the optional config file underneath it
    let store = Store::from_env();
    let conf = store.get_string("-conf", "getarg.toml");
    let mut store = store
        .with_toml_file_optional(&conf)
        .unwrap_or_else(|e| e.exit());

    // -connect implies -nolisten unless -listen or -nolisten was given
    if store.contains("-connect") {
        store.soft_set_bool_arg("-listen", false);
    }

    let datadir = store.get_string("-datadir", "~/.getarg");
    let port = store.get_int("-port", 8333);
    let listen = store.get_bool("-listen", true);
    let daemon = store.get_bool("-daemon", false);

    println!("Config:  {}", conf);
    println!("Datadir: {}", datadir);
    println!("Port:    {}", port);
    println!("Listen:  {}", listen);
    println!("Daemon:  {}", daemon);
    for peer in store.get_all("-connect") {
        println!("Connect: {}", peer);
    }
    if !store.trailing().is_empty() {
        println!("Command: {}", store.trailing().join(" "));
    }
}
