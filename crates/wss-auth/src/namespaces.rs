//! XML namespaces of the WSS protocol.
//!
//! These are fixed for the lifetime of the process and shared by every
//! document the client writes or reads.

/// A namespace prefix bound to its URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Namespace {
    pub prefix: &'static str,
    pub uri: &'static str,
}

impl Namespace {
    /// The `xmlns:prefix` attribute name declaring this namespace.
    pub fn xmlns_attribute(&self) -> String {
        format!("xmlns:{}", self.prefix)
    }

    /// Qualified element or attribute name within this namespace.
    pub fn qualify(&self, local_name: &str) -> String {
        format!("{}:{}", self.prefix, local_name)
    }
}

pub const OWS: Namespace = Namespace {
    prefix: "ows",
    uri: "http://www.opengis.net/ows",
};

pub const AUTHN: Namespace = Namespace {
    prefix: "authn",
    uri: "http://www.gdi-nrw.org/authentication",
};

pub const WSS: Namespace = Namespace {
    prefix: "wss",
    uri: "http://www.gdi-nrw.org/wss",
};

pub const XSI: Namespace = Namespace {
    prefix: "xsi",
    uri: "http://www.w3.org/2001/XMLSchema-instance",
};

/// Namespaces declared on the root of every `DoService` envelope, in declaration order.
pub const DO_SERVICE_DECLARATIONS: [Namespace; 4] = [AUTHN, WSS, OWS, XSI];
