use std::{sync::Arc, time::Duration};

use anyhow::Result;
use bytes::Bytes;
use http::Request;
use jsonh::{Json, JsonHandler, ResponseSink};
use serde::{Deserialize, Serialize};
use tokio::{sync::Notify, time::timeout};

#[derive(Debug, Deserialize)]
struct Input {
    n: u64,
}

#[derive(Debug, Serialize)]
struct Output {
    n: u64,
}

fn request(n: u64) -> Result<Request<Bytes>> {
    Ok(Request::post("/").body(Bytes::from(format!(r#"{{"n":{n}}}"#)))?)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_calls() -> Result<()> {
    async fn double(w: ResponseSink, Json(input): Json<Input>) -> jsonh::Result<Output> {
        tokio::task::yield_now().await;
        w.insert_header("x-n", input.n.into());
        Ok(Output { n: input.n * 2 })
    }
    let h = JsonHandler::new(double)?;
    let mut tasks = Vec::new();
    for n in 0..64 {
        let h = h.clone();
        tasks.push(tokio::spawn(async move {
            let r = h.call(request(n)?).await;
            anyhow::Ok((n, r))
        }));
    }
    for task in tasks {
        let (n, r) = task.await??;
        assert_eq!(r.status(), 200);
        assert_eq!(r.headers()["x-n"], n.to_string().as_str());
        assert_eq!(
            r.body(),
            format!(r#"{{"code":200,"msg":"success","data":{{"n":{}}}}}"#, n * 2).as_str()
        );
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn blocked_call_does_not_block_others() -> Result<()> {
    let release = Arc::new(Notify::new());
    let h = JsonHandler::new({
        let release = release.clone();
        move |Json(input): Json<Input>| {
            let release = release.clone();
            async move {
                if input.n == 0 {
                    release.notified().await;
                }
                Ok::<_, jsonh::Error>(Output { n: input.n })
            }
        }
    })?;

    let blocked = tokio::spawn({
        let h = h.clone();
        let request = request(0)?;
        async move { h.call(request).await }
    });
    for n in 1..4 {
        let r = timeout(Duration::from_secs(5), h.call(request(n)?)).await?;
        assert_eq!(r.status(), 200);
    }
    assert!(!blocked.is_finished());
    release.notify_one();
    let r = timeout(Duration::from_secs(5), blocked).await??;
    assert_eq!(r.status(), 200);
    assert_eq!(r.body(), r#"{"code":200,"msg":"success","data":{"n":0}}"#);
    Ok(())
}
