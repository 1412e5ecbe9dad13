use std::borrow::Borrow;

use attohttpc::{
    body, header::HeaderName, RequestBuilder as AttoHttpRequestBuilder,
    Response as AttoHttpResponse,
};
use eyre::{eyre, Error, Result, WrapErr};

use crate::http::{Headers, Method, RequestBuilder, Response};

type Bytes = Vec<u8>;

trait AttoHttpReqExt: Sized {
    fn set_headers(self, headers: Headers) -> Result<Self>;
}

impl AttoHttpReqExt for AttoHttpRequestBuilder<body::Bytes<Bytes>> {
    fn set_headers(mut self, headers: Headers) -> Result<Self> {
        for (h, v) in headers {
            let h = HeaderName::from_bytes(h.as_ref())
                .wrap_err_with(|| format!("Failed to parse header name {}", h))?;
            self = self.header(h, v);
        }
        Ok(self)
    }
}

/// Default request builder implemented on top of `attohttpc` crate.
#[derive(Debug)]
pub struct DefaultRequestBuilder {
    method: Method,
    url: String,
    params: Vec<(String, String)>,
    headers: Headers,
}

/// Request built by [`DefaultRequestBuilder`], sent with [`DefaultRequest::send`].
#[derive(Debug)]
pub struct DefaultRequest {
    builder: DefaultRequestBuilder,
    body: Bytes,
}

impl DefaultRequest {
    /// Send the request, blocking the current thread until the response body is read.
    ///
    /// # Errors
    /// If the request cannot be built or sent, or the response body cannot be read.
    pub fn send(self) -> Result<Response<Bytes>> {
        let Self {
            builder:
                DefaultRequestBuilder {
                    method,
                    url,
                    params,
                    headers,
                },
            body,
        } = self;

        let response = AttoHttpRequestBuilder::try_new(method.clone(), &url)
            .wrap_err_with(|| format!("Invalid http request {} {}", method, url))?
            .params(&params)
            .bytes(body)
            .set_headers(headers)?
            .send()
            .wrap_err_with(|| format!("Failed to send http {} request to {}", method, url))?;

        ClientResponse(response).try_into()
    }
}

impl RequestBuilder for DefaultRequestBuilder {
    type Output = DefaultRequest;

    fn new<U>(method: Method, url: U) -> Self
    where
        U: AsRef<str>,
    {
        Self {
            method,
            url: url.as_ref().to_owned(),
            params: Vec::new(),
            headers: Headers::new(),
        }
    }

    fn params<P, K, V>(mut self, params: P) -> Self
    where
        P: IntoIterator,
        P::Item: Borrow<(K, V)>,
        K: AsRef<str>,
        V: ToString,
    {
        self.params.extend(params.into_iter().map(|pair| {
            let (k, v) = pair.borrow();
            (k.as_ref().to_owned(), v.to_string())
        }));
        self
    }

    fn headers(mut self, headers: Headers) -> Self {
        self.headers.extend(headers);
        self
    }

    fn body(self, data: Vec<u8>) -> Self::Output {
        DefaultRequest {
            builder: self,
            body: data,
        }
    }
}

struct ClientResponse(AttoHttpResponse);

impl TryFrom<ClientResponse> for Response<Bytes> {
    type Error = Error;

    fn try_from(response: ClientResponse) -> Result<Self> {
        let ClientResponse(response) = response;
        let mut builder = Response::builder().status(response.status());
        let headers = builder
            .headers_mut()
            .ok_or_else(|| eyre!("Failed to get headers map reference."))?;
        for (key, value) in response.headers() {
            headers.insert(key, value.clone());
        }
        response
            .bytes()
            .wrap_err("Failed to get response as bytes")
            .and_then(|bytes| {
                builder
                    .body(bytes)
                    .wrap_err("Failed to construct response bytes body")
            })
    }
}
