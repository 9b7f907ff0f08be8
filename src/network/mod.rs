// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network inspection
//!
//! [`InspectorInterceptor`] reports every exchange that passes through an
//! [`HttpClient`](crate::http::HttpClient) to a [`NetworkEventReporter`].
//! [`NetworkRecorder`] is an in-memory reporter for analysis.

mod adapters;
mod body_helper;
mod decompression;
mod event;
mod forwarding;
mod interceptor;
mod recorder;
mod reporter;
mod response_handler;

pub use adapters::{ClientInspectorRequest, ClientInspectorResponse, HeaderList};
pub use body_helper::{CaptureSink, RequestBodyHelper};
pub use decompression::{decode, decoding_writer, ContentEncoding};
pub use event::{
    CapturedBody, ExchangeState, NetworkEvent, RequestInfo, ResponseInfo, TransferSize,
};
pub use forwarding::ForwardingResponseBody;
pub use interceptor::InspectorInterceptor;
pub use recorder::{EventCallback, NetworkRecorder, RecorderConfig};
pub use reporter::{
    InspectorHeaders, InspectorRequest, InspectorResponse, NetworkEventReporter,
    StreamInterpretation,
};
pub use response_handler::{DefaultResponseHandler, ResponseHandler, ResponseHandlingStream};
