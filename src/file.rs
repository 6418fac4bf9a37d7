use std::{
    path::Path,
    pin::Pin,
    task::{Context, Poll},
};

use actix_web::web::{Bytes, BytesMut};
use futures_core::Stream;
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio_util::codec::{BytesCodec, FramedRead};

pub(crate) struct File {
    inner: tokio::fs::File,
}

impl File {
    pub(crate) async fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(File {
            inner: tokio::fs::File::open(path).await?,
        })
    }

    pub(crate) async fn create(path: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(File {
            inner: tokio::fs::File::create(path).await?,
        })
    }

    pub(crate) async fn write_from_stream<S>(&mut self, stream: S) -> std::io::Result<u64>
    where
        S: Stream<Item = std::io::Result<Bytes>>,
    {
        let mut stream = std::pin::pin!(stream);

        let mut written = 0;

        while let Some(res) = stream.next().await {
            let mut bytes = res?;

            written += bytes.len() as u64;

            self.inner.write_all_buf(&mut bytes).await?;
        }

        Ok(written)
    }

    pub(crate) fn read_to_stream(self) -> impl Stream<Item = std::io::Result<Bytes>> {
        BytesFreezer {
            inner: FramedRead::new(self.inner, BytesCodec::new()),
        }
    }
}

pin_project_lite::pin_project! {
    struct BytesFreezer<S> {
        #[pin]
        inner: S,
    }
}

impl<S> Stream for BytesFreezer<S>
where
    S: Stream<Item = std::io::Result<BytesMut>>,
{
    type Item = std::io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();

        this.inner
            .poll_next(cx)
            .map(|opt| opt.map(|res| res.map(BytesMut::freeze)))
    }
}
