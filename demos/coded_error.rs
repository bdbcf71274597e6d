use bytes::Bytes;
use http::Request;
use jsonh::{Coder, JsonHandler};

#[derive(Debug, thiserror::Error)]
#[error("special error")]
struct SpecialError;

impl Coder for SpecialError {
    fn code(&self) -> i64 {
        1001
    }
}

async fn special() -> Result<(), SpecialError> {
    Err(SpecialError)
}

async fn hidden() -> jsonh::Result<()> {
    jsonh::bail!("database unreachable")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    for handler in [JsonHandler::new(special)?, JsonHandler::new(hidden)?] {
        let response = handler
            .call(Request::get("/cerr").body(Bytes::new())?)
            .await;
        println!("{}", response.status().as_u16());
        println!("{}", std::str::from_utf8(response.body())?);
    }
    Ok(())
}
