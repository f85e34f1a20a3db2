use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "thingspeak-dashboard",
    version,
    about = "Live ThingSpeak temperature/humidity dashboard"
)]
pub struct Args {
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
    #[arg(long, default_value_t = 3000)]
    pub port: u16,
}
