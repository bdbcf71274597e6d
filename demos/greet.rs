use bytes::Bytes;
use http::Request;
use jsonh::{Json, JsonHandler, Result};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Greet {
    greet: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct GreetResponse {
    reply: String,
}

async fn greet(Json(g): Json<Greet>) -> Result<GreetResponse> {
    Ok(GreetResponse {
        reply: format!("Thx for {:?}", g.greet),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let handler = JsonHandler::new(greet)?;
    let request = Request::get("/greet").body(Bytes::from_static(br#"{"Greet":"hello"}"#))?;
    let response = handler.call(request).await;
    println!("{}", response.status().as_u16());
    println!("{}", std::str::from_utf8(response.body())?);
    Ok(())
}
