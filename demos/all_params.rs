use bytes::Bytes;
use http::{HeaderValue, Request};
use jsonh::{Json, JsonHandler, RequestContext, ResponseSink, Result};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct Input {
    i: String,
}

#[derive(Serialize)]
struct Output {
    o: String,
    path: String,
}

async fn echo(w: ResponseSink, r: RequestContext, Json(input): Json<Input>) -> Result<Output> {
    w.insert_header("x-echo", HeaderValue::from_static("1"));
    Ok(Output {
        o: input.i,
        path: r.uri().path().to_string(),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let handler = JsonHandler::new(echo)?;
    let request = Request::get("/t").body(Bytes::from_static(br#"{"i":"from input"}"#))?;
    let response = handler.call(request).await;
    println!("{}", response.status().as_u16());
    println!("{:?}", response.headers());
    println!("{}", std::str::from_utf8(response.body())?);
    Ok(())
}
