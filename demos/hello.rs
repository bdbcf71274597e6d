use bytes::Bytes;
use http::Request;
use jsonh::{Error, JsonHandler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let handler = JsonHandler::new(|| async { Ok::<_, Error>("hello") })?;
    let response = handler
        .call(Request::get("/hello").body(Bytes::new())?)
        .await;
    println!("{}", response.status().as_u16());
    println!("{}", std::str::from_utf8(response.body())?);
    Ok(())
}
