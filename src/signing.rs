use crate::eip1193::{error::Eip1193Error, SharedProvider};
use async_trait::async_trait;
use ethers::{
    providers::{JsonRpcClient, Provider},
    types::Signature,
    utils::{hex::decode, serialize},
};
use futures::channel::oneshot;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    any::Any,
    fmt::{Debug, Formatter, Result as FmtResult},
    rc::Rc,
};
use unsafe_send_sync::UnsafeSendSync;
use wasm_bindgen_futures::spawn_local;

/// Turns a raw wallet provider into the higher level provider/signer pair the
/// application talks to after connecting.
pub trait SigningLibrary {
    fn wrap(&self, provider: &SharedProvider, account: &str) -> SigningSession;
}

/// Opaque provider/signer handles produced by a [`SigningLibrary`]
#[derive(Clone)]
pub struct SigningSession {
    provider: Rc<dyn Any>,
    signer: Rc<dyn Any>,
}

impl Debug for SigningSession {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "SigningSession")
    }
}

impl SigningSession {
    pub fn new<P: Any, S: Any>(provider: P, signer: S) -> Self {
        Self { provider: Rc::new(provider), signer: Rc::new(signer) }
    }

    pub fn provider<P: Any>(&self) -> Option<&P> {
        self.provider.downcast_ref::<P>()
    }

    pub fn signer<S: Any>(&self) -> Option<&S> {
        self.signer.downcast_ref::<S>()
    }

    /// The ethers provider, when the session comes from [`EthersLibrary`]
    pub fn ethers_provider(&self) -> Option<&Provider<InjectedClient>> {
        self.provider()
    }

    /// The injected signer, when the session comes from [`EthersLibrary`]
    pub fn injected_signer(&self) -> Option<&InjectedSigner> {
        self.signer()
    }
}

/// Default signing library: an ethers `Provider` and a signer bound to the
/// connected account.
#[derive(Clone, Copy, Debug, Default)]
pub struct EthersLibrary;

impl SigningLibrary for EthersLibrary {
    fn wrap(&self, provider: &SharedProvider, account: &str) -> SigningSession {
        let client = InjectedClient::new(provider.clone());
        let signer = InjectedSigner::new(client.clone(), account);
        SigningSession::new(Provider::new(client), signer)
    }
}

#[derive(Clone)]
// wasm is single threaded and the wallet object lives in the page. ethers
// wants Send + Sync clients, so the provider handle is wrapped and every
// request is driven from a local task.
pub struct InjectedClient {
    provider: UnsafeSendSync<SharedProvider>,
}

impl Debug for InjectedClient {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "InjectedClient")
    }
}

impl InjectedClient {
    pub fn new(provider: SharedProvider) -> Self {
        Self { provider: UnsafeSendSync::new(provider) }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl JsonRpcClient for InjectedClient {
    type Error = Eip1193Error;

    /// Sends the request through the injected wallet
    async fn request<T: Serialize + Send + Sync, R: DeserializeOwned + Send>(
        &self,
        method: &str,
        params: T,
    ) -> Result<R, Self::Error> {
        let (sender, receiver) = oneshot::channel();

        let m = method.to_string();
        let params = serde_json::to_value(params)?;
        let provider = self.provider.clone();
        spawn_local(async move {
            _ = sender.send(provider.request(&m, params).await);
        });

        let res = receiver.await.map_err(|_| Eip1193Error::CommunicationError)??;
        Ok(serde_json::from_value(res)?)
    }
}

/// Signs on behalf of the connected account through the wallet
#[derive(Clone, Debug)]
pub struct InjectedSigner {
    client: InjectedClient,
    address: String,
}

impl InjectedSigner {
    pub fn new(client: InjectedClient, address: &str) -> Self {
        Self { client, address: address.to_string() }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub async fn sign_typed_data<T: Send + Sync + Serialize>(
        &self,
        data: T,
    ) -> Result<Signature, Eip1193Error> {
        let data = serialize(&data);
        let from = serialize(&self.address);

        let sig: String = self.client.request("eth_signTypedData_v4", [from, data]).await?;
        decode_signature(&sig)
    }

    /// `personal_sign` over UTF-8 `message`
    pub async fn sign_message(&self, message: &str) -> Result<Signature, Eip1193Error> {
        let message = format!("0x{}", hex::encode(message.as_bytes()));

        let sig: String =
            self.client.request("personal_sign", [message, self.address.clone()]).await?;
        decode_signature(&sig)
    }
}

fn decode_signature(sig: &str) -> Result<Signature, Eip1193Error> {
    let sig = sig.strip_prefix("0x").unwrap_or(sig);
    let sig = decode(sig)?;
    Ok(Signature::try_from(sig.as_slice())?)
}
