use alloc::sync::Arc;

pub(crate) trait Service<Request> {
    type Response;
    type Error;

    fn call(&self, request: Request) -> Result<Self::Response, Self::Error>;
}

pub(crate) type BoxedService<Request, Response, Error> = Arc<dyn Service<Request, Response = Response, Error = Error> + Send + Sync>;

#[inline]
#[must_use]
pub(crate) const fn service_fn<T>(f: T) -> ServiceFn<T> {
    ServiceFn { f }
}

#[derive(Clone)]
pub(crate) struct ServiceFn<T> {
    f: T,
}

impl<F, Request, Response, Error> Service<Request> for ServiceFn<F>
where
    F: Fn(Request) -> Result<Response, Error>,
{
    type Response = Response;
    type Error = Error;

    #[inline]
    fn call(&self, request: Request) -> Result<Self::Response, Self::Error> {
        (self.f)(request)
    }
}
